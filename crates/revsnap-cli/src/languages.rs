//! Language coverage command handlers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use clap::Subcommand;
use revsnap_analytics::{coverage_report, LanguageShare};
use revsnap_db::{BrandLanguageRow, BrandRow};

#[derive(Debug, Subcommand)]
pub enum LanguageCommands {
    /// Show the review language distribution and which languages get themes
    Analyze {
        /// Restrict the analysis to one brand (by slug)
        #[arg(long)]
        brand: Option<String>,
    },
    /// Compare the most common languages of every active brand side by side
    Compare {
        /// Languages to list per brand
        #[arg(long, default_value_t = 5)]
        top: i64,
    },
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &revsnap_core::AppConfig,
    command: LanguageCommands,
) -> anyhow::Result<()> {
    match command {
        LanguageCommands::Analyze { brand } => run_analyze(pool, config, brand.as_deref()).await,
        LanguageCommands::Compare { top } => run_compare(pool, top).await,
    }
}

async fn run_analyze(
    pool: &sqlx::PgPool,
    config: &revsnap_core::AppConfig,
    brand_slug: Option<&str>,
) -> anyhow::Result<()> {
    let (brand_id, scope) = match brand_slug {
        Some(slug) => {
            let brand = revsnap_db::get_brand_by_slug(pool, slug)
                .await?
                .ok_or_else(|| anyhow::anyhow!("brand '{slug}' not found"))?;
            (Some(brand.id), brand.name)
        }
        None => (None, "all brands".to_string()),
    };

    let rows = revsnap_db::language_counts(pool, brand_id).await?;
    let counts: BTreeMap<String, u64> = rows
        .into_iter()
        .map(|(lang, count)| (lang, u64::try_from(count).unwrap_or(0)))
        .collect();

    let min_pct = config.analytics.min_language_coverage_pct;
    let shares = coverage_report(&counts, min_pct);
    if shares.is_empty() {
        println!("no reviews found for {scope}");
        return Ok(());
    }

    print!("{}", render_coverage(&scope, &shares, min_pct));
    Ok(())
}

/// Table of language shares with a `*` marker on languages that clear the
/// threshold and have an extraction pipeline.
pub(crate) fn render_coverage(scope: &str, shares: &[LanguageShare], min_pct: f64) -> String {
    let total: u64 = shares.iter().map(|s| s.count).sum();
    let mut out = String::new();

    let _ = writeln!(out, "language distribution for {scope} ({total} reviews)");
    let _ = writeln!(
        out,
        "{:<3} {:<8} {:>8} {:>7}  {}",
        "", "lang", "reviews", "share", "pipeline"
    );
    for share in shares {
        let marker = if share.significant { "*" } else { "" };
        let _ = writeln!(
            out,
            "{:<3} {:<8} {:>8} {:>6.1}%  {}",
            marker,
            share.language,
            share.count,
            share.pct,
            share.resource_id.unwrap_or("-")
        );
    }

    let selected: Vec<&str> = shares
        .iter()
        .filter(|s| s.significant)
        .map(|s| s.language.as_str())
        .collect();
    let _ = writeln!(out);
    if selected.is_empty() {
        let _ = writeln!(
            out,
            "no language reaches {min_pct:.1}% with a pipeline; themes will be empty"
        );
    } else {
        let _ = writeln!(
            out,
            "* themes extracted for {} (threshold {min_pct:.1}%)",
            selected.join(", ")
        );
    }

    out
}

async fn run_compare(pool: &sqlx::PgPool, top: i64) -> anyhow::Result<()> {
    let brands = revsnap_db::list_active_brands(pool).await?;
    if brands.is_empty() {
        println!("no active brands found; run `db seed` first");
        return Ok(());
    }

    let rows = revsnap_db::top_languages_by_brand(pool, top.max(1)).await?;
    print!("{}", render_comparison(&brands, &rows));
    Ok(())
}

/// One block per brand with its top languages and their share of the
/// brand's reviews.
pub(crate) fn render_comparison(brands: &[BrandRow], rows: &[BrandLanguageRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "language comparison across {} brand(s)", brands.len());

    for brand in brands {
        let langs: Vec<&BrandLanguageRow> =
            rows.iter().filter(|r| r.brand_id == brand.id).collect();
        let total = langs.first().map_or(0, |r| r.brand_total);

        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({})", brand.name, brand.domain);
        let _ = writeln!(out, "  total reviews: {total}");
        if langs.is_empty() {
            let _ = writeln!(out, "  no reviews");
            continue;
        }
        for row in langs {
            #[allow(clippy::cast_precision_loss)]
            let pct = if row.brand_total > 0 {
                row.review_count as f64 / row.brand_total as f64 * 100.0
            } else {
                0.0
            };
            let _ = writeln!(
                out,
                "  - {}: {} ({pct:.1}%)",
                row.language, row.review_count
            );
        }
    }

    out
}
