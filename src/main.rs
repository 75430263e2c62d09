//! space-photos - fetch space imagery and publish it to Telegram

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use space_photos::config::hours_to_duration;
use space_photos::sources::{DEFAULT_APOD_COUNT, DEFAULT_LAUNCH_ID};
use space_photos::{
    ApodQuery, ApodSource, Config, EpicSource, ImageFetcher, ImageSource, Publisher, Result,
    SpacexLaunchSource, TelegramClient, download_all, wait_for_signal,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "space-photos",
    version,
    about = "Fetch space imagery and publish it to a Telegram channel"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish images to Telegram, forever or a single one with --image
    Publish {
        /// Pause after each published image, in hours
        #[arg(long, default_value_t = 4.0)]
        hours: f64,
        /// Publish only this file and exit
        #[arg(long)]
        image: Option<PathBuf>,
        /// Target chat or channel, overrides TELEGRAM_CHAT_ID
        #[arg(long = "chat_id")]
        chat_id: Option<String>,
    },
    /// Download NASA Astronomy Pictures of the Day
    FetchApod {
        /// Number of random pictures
        #[arg(long, default_value_t = DEFAULT_APOD_COUNT, conflicts_with = "date")]
        count: u32,
        /// Picture of one day (YYYY-MM-DD) instead of random ones
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output directory, overrides NASA_APOD_IMAGES_PATH
        #[arg(long)]
        images_path: Option<PathBuf>,
    },
    /// Download the latest NASA EPIC Earth images
    FetchEpic {
        /// Output directory, overrides NASA_EPIC_IMAGES_PATH
        #[arg(long)]
        images_path: Option<PathBuf>,
    },
    /// Download the Flickr photos of a SpaceX launch
    FetchSpacex {
        /// Launch id
        #[arg(long, default_value = DEFAULT_LAUNCH_ID)]
        id: String,
        /// Output directory, overrides NASA_SPACEX_IMAGES_PATH
        #[arg(long)]
        images_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "fatal error");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Publish {
            hours,
            image,
            chat_id,
        } => {
            let delay = hours_to_duration(hours)?;
            let target = config.resolve_chat_id(chat_id.as_deref())?;
            let publisher = Publisher::new(TelegramClient::new(config)?, config);

            if let Some(image) = image {
                return publisher.run_once(&image, &target).await;
            }

            tokio::select! {
                // the loop only ends on error
                result = publisher.run_unattended(&target, delay) => result.map(|never| match never {}),
                _ = wait_for_signal() => {
                    tracing::info!("shutting down");
                    Ok(())
                }
            }
        }
        Commands::FetchApod {
            count,
            date,
            images_path,
        } => {
            let query = match date {
                Some(date) => ApodQuery::Date(date),
                None => ApodQuery::Count(count),
            };
            let fetcher = ImageFetcher::new(config)?;
            let source = ApodSource::new(fetcher.client().clone(), config, query)?;
            fetch(&source, &fetcher, images_path.unwrap_or_else(|| config.apod_dir.clone())).await
        }
        Commands::FetchEpic { images_path } => {
            let fetcher = ImageFetcher::new(config)?;
            let source = EpicSource::new(fetcher.client().clone(), config)?;
            fetch(&source, &fetcher, images_path.unwrap_or_else(|| config.epic_dir.clone())).await
        }
        Commands::FetchSpacex { id, images_path } => {
            let fetcher = ImageFetcher::new(config)?;
            let source = SpacexLaunchSource::new(fetcher.client().clone(), config, id);
            fetch(&source, &fetcher, images_path.unwrap_or_else(|| config.spacex_dir.clone())).await
        }
    }
}

async fn fetch(source: &dyn ImageSource, fetcher: &ImageFetcher, dir: PathBuf) -> Result<()> {
    let saved = download_all(source, fetcher, &dir).await?;
    println!("Saved {} image(s) to {}", saved.len(), dir.display());
    Ok(())
}
