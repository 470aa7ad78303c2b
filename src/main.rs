use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use unit_converter::app::{ConverterWidget, convert_input};
use unit_converter::assets::{
    AssetManifest, HttpAssetFetcher, OfflineAssetCache, SqliteAssetStorage,
};
use unit_converter::config::{self, AppConfig};
use unit_converter::rates::providers::ErApiProvider;
use unit_converter::rates::{RateCacheManager, RefreshOutcome, RefreshStatus, SqliteStore};
use unit_converter::units::{CategoryId, UnitRegistry, format_value};

#[derive(Parser)]
#[command(name = "unit-converter")]
#[command(version, about = "Convert units and currencies, online or offline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a value between two units of a category
    Convert {
        category: String,
        from: String,
        to: String,
        value: String,
        /// Convert from the second unit to the first
        #[arg(long)]
        reverse: bool,
        /// Use only stored currency rates
        #[arg(long)]
        offline: bool,
    },
    /// List the units of one or all categories
    Units {
        category: Option<String>,
        #[arg(long)]
        offline: bool,
    },
    /// Refresh currency rates and print them
    Rates {
        #[arg(long)]
        offline: bool,
    },
    /// Manage the offline asset cache
    Assets {
        #[command(subcommand)]
        action: AssetsAction,
    },
}

#[derive(Subcommand)]
enum AssetsAction {
    /// Fetch and store every manifest asset as the configured version
    Install,
    /// Make the configured version live and purge the others
    Activate,
    /// Install then activate
    Update,
    /// Serve one URL cache-first and print the body
    Get { url: String },
    /// Show the cache state
    Status,
}

fn init_tracing() -> anyhow::Result<WorkerGuard> {
    let data_dir = config::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let log_path = config::log_path();
    let file_name = log_path
        .file_name()
        .context("Log path has no file name")?;
    let appender = tracing_appender::rolling::never(&data_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // RUST_LOG overrides the default level (e.g. RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

/// Builds the widget with currency rates refreshed from the provider, or
/// read from the store only when `offline` is set.
async fn load_widget(config: &AppConfig, offline: bool) -> anyhow::Result<ConverterWidget> {
    let store = Arc::new(SqliteStore::new(&config::rates_db_path())?);
    let provider = Arc::new(ErApiProvider::new(&config.rates.endpoint));
    let manager = RateCacheManager::new(store, provider, config.rates.currencies.clone());

    let mut widget = ConverterWidget::new(UnitRegistry::new());
    if offline {
        let result = manager.cached_snapshot().map(|snapshot| RefreshOutcome {
            snapshot,
            status: RefreshStatus::Offline,
        });
        widget.apply_refresh(result, manager.currencies());
    } else {
        widget.load_rates(&manager).await;
    }
    Ok(widget)
}

fn parse_category(name: &str) -> anyhow::Result<CategoryId> {
    name.parse::<CategoryId>()
        .map_err(|_| anyhow::anyhow!("Unknown category: {}", name))
}

fn print_units(widget: &mut ConverterWidget, category: CategoryId) {
    println!("{}:", category);
    for option in widget.select_category(category) {
        println!("  {:<8} {}", option.code, option.display_name);
    }
}

async fn run_assets(config: &AppConfig, action: AssetsAction) -> anyhow::Result<()> {
    let storage = Arc::new(SqliteAssetStorage::new(&config::assets_db_path())?);
    let manifest = AssetManifest::new(
        &config.assets.cache_version,
        &config.assets.base_url,
        config.assets.manifest.clone(),
    )?;
    let mut cache = OfflineAssetCache::new(storage, Arc::new(HttpAssetFetcher::new()), manifest)?;

    match action {
        AssetsAction::Install => {
            let count = cache.install().await?;
            println!("Installed {} assets as {}", count, cache.current_version());
        }
        AssetsAction::Activate => {
            let deleted = cache.activate()?;
            println!("Activated {}", cache.current_version());
            for name in deleted {
                println!("Deleted {}", name);
            }
        }
        AssetsAction::Update => {
            let count = cache.install().await?;
            let deleted = cache.activate()?;
            println!(
                "Installed {} assets as {} (deleted {} old versions)",
                count,
                cache.current_version(),
                deleted.len()
            );
        }
        AssetsAction::Get { url } => {
            let response = cache.respond(&url).await?;
            if !response.is_success() {
                anyhow::bail!("{} returned status {}", response.url, response.status);
            }
            print!("{}", String::from_utf8_lossy(&response.body));
        }
        AssetsAction::Status => {
            println!("state: {}", cache.state().as_str());
            println!("live: {}", cache.live_version().unwrap_or("-"));
            println!("current: {}", cache.current_version());
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(&config::config_path())?;
    info!("Loaded configuration");

    match cli.command {
        Command::Convert {
            category,
            from,
            to,
            value,
            reverse,
            offline,
        } => {
            let registry = if parse_category(&category)? == CategoryId::Currency {
                let widget = load_widget(&config, offline).await?;
                eprintln!("{}", widget.status());
                widget.registry().clone()
            } else {
                UnitRegistry::new()
            };

            let output = convert_input(&registry, &category, &from, &to, &value, reverse)?;
            println!("{}", output);
        }
        Command::Units { category, offline } => {
            let mut widget = load_widget(&config, offline).await?;
            match category {
                Some(name) => print_units(&mut widget, parse_category(&name)?),
                None => {
                    for id in CategoryId::ALL {
                        print_units(&mut widget, id);
                    }
                }
            }
            eprintln!("{}", widget.status());
        }
        Command::Rates { offline } => {
            let widget = load_widget(&config, offline).await?;
            println!("{}", widget.status());
            for (code, unit) in widget.registry().category(CategoryId::Currency).iter() {
                println!("  {:<4} {:>14} USD  {}", code, format_value(unit.rate), unit.display_name);
            }
        }
        Command::Assets { action } => run_assets(&config, action).await?,
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing()?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
