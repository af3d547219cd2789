//! Snapshot generation and viewing command handlers.

mod show;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;
use futures::stream::{self, StreamExt};
use revsnap_analytics::{
    BackfillDriver, BackfillSummary, MemoTranslator, ProvisionOutcome, ResourceCache,
    ResourceManager,
};
use revsnap_db::{BrandRow, PgStore};

use crate::backends::{ProviderBackend, TranslatorBackend};
use crate::load_brands_for_run;

pub(crate) use show::{run_list_brands, run_show};

/// Sub-commands available under `snapshots`.
#[derive(Debug, Subcommand)]
pub enum SnapshotCommands {
    /// Assemble and store weekly snapshots
    Generate {
        /// Restrict generation to a specific brand (by slug)
        #[arg(long)]
        brand: Option<String>,

        /// Backfill every week from the first review through the current week
        #[arg(long)]
        historical: bool,

        /// Assemble snapshots without writing them to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print stored snapshots with week-over-week changes
    Show {
        /// Brand to show (by slug)
        #[arg(long)]
        brand: String,

        /// Number of most recent weeks to print
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// List active brands with their stored snapshot count and week range
    ListBrands,
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &revsnap_core::AppConfig,
    command: SnapshotCommands,
) -> anyhow::Result<()> {
    match command {
        SnapshotCommands::Generate {
            brand,
            historical,
            dry_run,
        } => run_generate(pool, config, brand.as_deref(), historical, dry_run).await,
        SnapshotCommands::Show { brand, limit } => run_show(pool, &brand, limit).await,
        SnapshotCommands::ListBrands => run_list_brands(pool).await,
    }
}

/// Set `stop` on the first Ctrl-C so running backfills finish their current
/// week and return.
fn install_stop_handler(stop: &Arc<AtomicBool>) {
    let stop = Arc::clone(stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping after the current week");
            stop.store(true, Ordering::Relaxed);
        }
    });
}

fn log_provisioning(brand: &BrandRow, summary: &BackfillSummary) {
    for (lang, outcome) in summary.report.iter() {
        match outcome {
            ProvisionOutcome::Ready(resource) => tracing::info!(
                brand = %brand.slug,
                lang,
                resource = %resource.handle.resource_id,
                "extraction pipeline ready"
            ),
            ProvisionOutcome::Skipped(reason) => {
                tracing::info!(brand = %brand.slug, lang, %reason, "language skipped");
            }
            ProvisionOutcome::Failed(reason) => {
                tracing::warn!(brand = %brand.slug, lang, %reason, "language unavailable");
            }
        }
    }
}

fn print_summary(brand: &BrandRow, summary: &BackfillSummary, dry_run: bool) {
    let verb = if dry_run { "assembled" } else { "wrote" };
    let stopped = if summary.stopped { " (stopped early)" } else { "" };
    match &summary.last {
        Some(last) => println!(
            "{}: {verb} {} week(s){stopped}; latest {} with {} new reviews, avg {:.2}",
            brand.slug,
            summary.weeks_written,
            last.iso_week,
            last.new_reviews_this_week,
            last.avg_rating,
        ),
        None => println!("{}: {verb} 0 weeks{stopped}", brand.slug),
    }
}

/// Generate snapshots for all (or one) brand(s).
///
/// Brands run concurrently up to `REVSNAP_MAX_CONCURRENT_BRANDS`; weeks of
/// one brand always run in order. A failing brand is logged and skipped.
///
/// # Errors
///
/// Returns an error if the brand filter is unknown, a service client cannot
/// be built, or every brand failed.
pub(crate) async fn run_generate(
    pool: &sqlx::PgPool,
    config: &revsnap_core::AppConfig,
    brand_filter: Option<&str>,
    historical: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let brands = load_brands_for_run(pool, brand_filter).await?;
    if brands.is_empty() {
        println!("no active brands found; run `db seed` first");
        return Ok(());
    }

    let store = PgStore::new(pool.clone());
    let cache = ResourceCache::load_or_new(&config.resource_cache_path);
    tracing::debug!(
        path = %config.resource_cache_path.display(),
        cached = ?cache.entries(),
        "resource cache loaded"
    );
    let resources = ResourceManager::new(ProviderBackend::from_config(config)?, cache);
    let translator = MemoTranslator::new(TranslatorBackend::from_config(config)?);
    let stop = Arc::new(AtomicBool::new(false));
    install_stop_handler(&stop);

    let today = Utc::now().date_naive();
    let analytics = &config.analytics;
    let max_concurrent = config.max_concurrent_brands.max(1);

    tracing::info!(
        brands = brands.len(),
        historical,
        dry_run,
        max_concurrent,
        "generating snapshots"
    );

    let results: Vec<_> = stream::iter(&brands)
        .map(|brand| {
            let driver = BackfillDriver::new(&store, &resources, &translator, analytics, &stop)
                .dry_run(dry_run);
            async move {
                let result = if historical {
                    driver.run_historical(brand.id, today).await
                } else {
                    driver.run_current_week(brand.id, today).await
                };
                (brand, result)
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let mut failed_brands = 0usize;
    for (brand, result) in &results {
        match result {
            Ok(summary) => {
                log_provisioning(brand, summary);
                print_summary(brand, summary, dry_run);
            }
            Err(e) => {
                tracing::error!(brand = %brand.slug, error = %e, "snapshot generation failed");
                eprintln!("error: {}: {e}", brand.slug);
                failed_brands += 1;
            }
        }
    }

    if failed_brands > 0 {
        tracing::warn!(
            failed_brands,
            total_brands = brands.len(),
            "some brands failed snapshot generation"
        );
    }
    if failed_brands == brands.len() {
        anyhow::bail!("all {failed_brands} brands failed snapshot generation");
    }

    Ok(())
}
