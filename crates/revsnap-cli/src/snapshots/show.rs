//! Read-only snapshot viewer.

use std::fmt::Write as _;

use revsnap_core::{CanonicalTheme, WeeklySnapshot, WowDelta};
use revsnap_db::BrandSnapshotSummaryRow;

const RULE_WIDTH: usize = 80;

fn theme_line(themes: &[CanonicalTheme]) -> String {
    themes
        .iter()
        .take(5)
        .map(|t| format!("{} ({})", t.display, t.count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable block for one snapshot, week-over-week changes included.
pub(crate) fn render_snapshot(snap: &WeeklySnapshot) -> String {
    let wow = WowDelta::from_snapshot(snap);
    let (pos_pct, neu_pct, neg_pct) = snap.sentiment_percentages();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} ({} to {})",
        snap.iso_week, snap.week_start, snap.week_end
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    let _ = writeln!(out, "volume");
    let _ = writeln!(out, "  total to date:  {}", snap.total_reviews_to_date);
    let _ = writeln!(out, "  new this week:  {}", snap.new_reviews_this_week);
    let _ = writeln!(out, "  previous week:  {}", snap.prev_week_review_count);
    let _ = writeln!(
        out,
        "  wow change:     {:+} ({:+.1}%)",
        wow.review_change, wow.review_change_pct
    );

    let _ = writeln!(out, "rating");
    let _ = writeln!(out, "  average:        {:.2}/5", snap.avg_rating);
    let _ = writeln!(out, "  previous week:  {:.2}/5", snap.prev_week_avg_rating);
    let _ = writeln!(out, "  wow change:     {:+.2}", wow.rating_change);

    let _ = writeln!(out, "sentiment");
    let _ = writeln!(
        out,
        "  positive:       {} ({pos_pct:.1}%)",
        snap.positive_count
    );
    let _ = writeln!(out, "  neutral:        {} ({neu_pct:.1}%)", snap.neutral_count);
    let _ = writeln!(
        out,
        "  negative:       {} ({neg_pct:.1}%)",
        snap.negative_count
    );

    let _ = writeln!(out, "responses");
    let _ = writeln!(out, "  response rate:  {:.1}%", snap.response_rate);
    let _ = writeln!(
        out,
        "  avg response:   {:.1} days",
        snap.avg_response_time_days
    );

    let languages = snap.top_languages(3);
    if !languages.is_empty() {
        let _ = writeln!(out, "top languages");
        for (lang, count) in languages {
            let _ = writeln!(out, "  {lang}: {count}");
        }
    }

    if !snap.source_distribution.is_empty() {
        let _ = writeln!(out, "sources");
        for (source, count) in &snap.source_distribution {
            let _ = writeln!(out, "  {source}: {count}");
        }
    }

    if !snap.positive_themes.is_empty() {
        let _ = writeln!(out, "positive themes");
        let _ = writeln!(out, "  {}", theme_line(&snap.positive_themes));
    }
    if !snap.negative_themes.is_empty() {
        let _ = writeln!(out, "negative themes");
        let _ = writeln!(out, "  {}", theme_line(&snap.negative_themes));
    }

    out
}

/// Print the `limit` most recent snapshots of one brand, newest first.
///
/// # Errors
///
/// Returns an error if the brand is unknown, the query fails, or a stored
/// snapshot cannot be decoded.
pub(crate) async fn run_show(pool: &sqlx::PgPool, slug: &str, limit: i64) -> anyhow::Result<()> {
    let brand = revsnap_db::get_brand_by_slug(pool, slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("brand '{slug}' not found"))?;

    let rows = revsnap_db::list_snapshots(pool, brand.id, limit.max(1)).await?;
    if rows.is_empty() {
        println!("no snapshots found for brand '{slug}'; run `snapshots generate` first");
        return Ok(());
    }

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("weekly snapshots for {} ({})", brand.name, brand.domain);
    println!("{}", "=".repeat(RULE_WIDTH));
    for row in rows {
        let snap = row.into_snapshot()?;
        println!();
        print!("{}", render_snapshot(&snap));
    }

    Ok(())
}

/// One line per brand with its snapshot count and stored week range.
pub(crate) fn render_brand_list(rows: &[BrandSnapshotSummaryRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<24} {:<28} {:>9}  {}", "slug", "name", "snapshots", "weeks");
    for row in rows {
        let range = match (row.first_week, row.last_week) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<24} {:<28} {:>9}  {range}",
            row.slug, row.name, row.snapshot_count
        );
    }
    out
}

/// Print every active brand with its snapshot coverage.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_list_brands(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let rows = revsnap_db::list_snapshot_coverage(pool).await?;
    if rows.is_empty() {
        println!("no active brands found; run `db seed` first");
        return Ok(());
    }
    print!("{}", render_brand_list(&rows));
    Ok(())
}

#[cfg(test)]
#[path = "show_test.rs"]
mod tests;
