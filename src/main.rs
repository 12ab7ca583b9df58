use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use craftdb::{export, load_config, CraftDb, CraftError, OutputFormat};
use log::{error, warn};

#[derive(Debug, Parser)]
#[command(
    name = "craftdb",
    version,
    about = "Harvest craftable items and recipes from a game wiki into a dataset"
)]
struct Cli {
    /// Configuration file (defaults to ./craftdb.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Wiki origin, e.g. https://terraria.wiki.gg
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Where to write the dataset
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<Format>,
    /// Maximum number of recipe pages fetched at once
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,
    /// Keep remote image references instead of downloading icons
    #[arg(long)]
    no_images: bool,
    #[arg(long, value_name = "PATH")]
    image_dir: Option<PathBuf>,
    /// Abort on the first page that cannot be fetched or parsed
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Javascript,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Javascript => OutputFormat::Javascript,
        }
    }
}

async fn run(cli: Cli) -> Result<(), CraftError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(dir) = cli.image_dir {
        config.images.dir = dir;
    }
    if cli.no_images {
        config.images.enabled = false;
    }
    if cli.strict {
        config.strict = true;
    }
    let output = cli.output.unwrap_or_else(|| config.output.path.clone());
    let format = cli.format.map(OutputFormat::from).unwrap_or(config.output.format);

    let harvest = CraftDb::builder().config(config).build().await?;
    for failure in &harvest.skipped {
        warn!("Skipped {}: {}", failure.page, failure.error);
    }

    export::write(&harvest.dataset, &output, format).await?;
    println!(
        "{} items, {} recipes written to {} ({} pages skipped)",
        harvest.dataset.items.len(),
        harvest.dataset.recipes.len(),
        output.display(),
        harvest.skipped.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
