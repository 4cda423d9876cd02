use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use weatherbot_core::{
    Config, DarkSky, GoogleGeocoder, GoogleTimezone, ServiceId, TurnEvent, WeatherBot,
    WebcamsTravel,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Weather dialogue bot harness")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific service.
    Configure {
        /// Service short name: "google", "darksky" or "webcams".
        service: String,
    },

    /// Process one turn event (host-platform JSON) and print the reply.
    Turn {
        /// Read the event from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { service } => configure(&service),
            Command::Turn { file } => turn(file).await,
        }
    }
}

fn configure(service: &str) -> Result<()> {
    let service = ServiceId::try_from(service)?;
    let mut config = Config::load()?;

    let api_key = inquire::Password::new(&format!("API key for '{service}':"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_api_key(service, api_key);
    config.save()?;

    println!("Saved credentials for '{service}' to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn turn(file: Option<PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read event file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };

    let event: TurnEvent =
        serde_json::from_str(&raw).context("Failed to parse turn event JSON")?;

    let mut bot = bot_from_config(&Config::load()?)?;
    let response = bot.dispatch(event).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn bot_from_config(config: &Config) -> Result<WeatherBot> {
    let google_key = config.require_api_key(ServiceId::Google)?.to_owned();
    let darksky_key = config.require_api_key(ServiceId::DarkSky)?.to_owned();
    let webcams_key = config.require_api_key(ServiceId::Webcams)?.to_owned();

    Ok(WeatherBot::new(
        Arc::new(GoogleGeocoder::new(google_key.clone())),
        Arc::new(DarkSky::new(darksky_key)),
        Arc::new(GoogleTimezone::new(google_key)),
        Arc::new(WebcamsTravel::new(webcams_key)),
    ))
}
