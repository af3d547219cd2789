mod backends;
mod languages;
mod reviews;
mod snapshots;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::languages::LanguageCommands;
use crate::reviews::ReviewCommands;
use crate::snapshots::SnapshotCommands;

#[derive(Debug, Parser)]
#[command(name = "revsnap")]
#[command(about = "Weekly review analytics snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Generate and inspect weekly snapshots
    Snapshots {
        #[command(subcommand)]
        command: SnapshotCommands,
    },
    /// Review language coverage
    Languages {
        #[command(subcommand)]
        command: LanguageCommands,
    },
    /// Review data quality checks
    Reviews {
        #[command(subcommand)]
        command: ReviewCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert brands from the brands YAML file
    Seed,
}

/// Resolve the brands a command operates on: the one named by `brand_filter`,
/// or every active brand.
///
/// # Errors
///
/// Returns an error if the brand filter slug is not found.
pub(crate) async fn load_brands_for_run(
    pool: &sqlx::PgPool,
    brand_filter: Option<&str>,
) -> anyhow::Result<Vec<revsnap_db::BrandRow>> {
    if let Some(slug) = brand_filter {
        let brand = revsnap_db::get_brand_by_slug(pool, slug)
            .await?
            .ok_or_else(|| anyhow::anyhow!("brand '{slug}' not found"))?;
        Ok(vec![brand])
    } else {
        Ok(revsnap_db::list_active_brands(pool).await?)
    }
}

async fn run_db(
    pool: &sqlx::PgPool,
    config: &revsnap_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            revsnap_db::health_check(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = revsnap_db::run_migrations(pool).await?;
            println!("migrations up to date ({applied} applied)");
        }
        DbCommands::Seed => {
            let file = revsnap_core::load_brands(&config.brands_path)?;
            let seeded = revsnap_db::seed_brands(pool, &file.brands).await?;
            println!(
                "seeded {seeded} brands from {}",
                config.brands_path.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("revsnap: no command given; run with --help for usage");
        return Ok(());
    };

    let config = revsnap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = revsnap_db::PoolConfig::from_app_config(&config);
    let pool = revsnap_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => run_db(&pool, &config, command).await,
        Commands::Snapshots { command } => snapshots::run(&pool, &config, command).await,
        Commands::Languages { command } => languages::run(&pool, &config, command).await,
        Commands::Reviews { command } => reviews::run(&pool, command).await,
    }
}

#[cfg(test)]
mod tests;
