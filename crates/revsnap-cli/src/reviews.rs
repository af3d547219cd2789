//! Review data-quality command handlers.

use std::fmt::Write as _;

use clap::Subcommand;
use revsnap_db::InvalidRatingRow;

#[derive(Debug, Subcommand)]
pub enum ReviewCommands {
    /// List reviews with ratings outside 1 to 5 and the rating distribution
    AuditRatings {
        /// Maximum number of invalid reviews to list
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

pub(crate) async fn run(pool: &sqlx::PgPool, command: ReviewCommands) -> anyhow::Result<()> {
    match command {
        ReviewCommands::AuditRatings { limit } => {
            let invalid = revsnap_db::list_invalid_ratings(pool, limit.max(1)).await?;
            let distribution = revsnap_db::rating_distribution(pool).await?;
            tracing::info!(invalid = invalid.len(), "rating audit complete");
            print!("{}", render_audit(&invalid, &distribution));
            Ok(())
        }
    }
}

fn render_audit(invalid: &[InvalidRatingRow], distribution: &[(i16, i64)]) -> String {
    let mut out = String::new();

    if invalid.is_empty() {
        let _ = writeln!(out, "no reviews with invalid ratings");
    } else {
        let _ = writeln!(out, "{} review(s) with invalid ratings:", invalid.len());
        for row in invalid {
            let date = row
                .published_date
                .map_or_else(|| "undated".to_string(), |d| d.date_naive().to_string());
            let _ = writeln!(
                out,
                "  [{}] {} rating={} {} {:?}",
                row.id, row.brand_name, row.rating, date, row.title
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "rating distribution:");
    let total: i64 = distribution.iter().map(|(_, n)| n).sum();
    for (rating, count) in distribution {
        let flag = if (1..=5).contains(rating) { "" } else { "  (invalid)" };
        let _ = writeln!(out, "  {rating:>3}: {count}{flag}");
    }
    let _ = writeln!(out, "  total: {total}");

    out
}
