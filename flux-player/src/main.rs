use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use flux_model::{RecordId, VideoId};
use log::LevelFilter;

use flux_player::domains::location::{LocationState, SearchParams};
use flux_player::domains::media::sequence;
use flux_player::infra::api_client::ApiClient;
use flux_player::infra::config::Config;
use flux_player::infra::constants::routes;
use flux_player::infra::services::ApiService;

#[derive(Parser, Debug)]
#[command(name = "flux-player", about = "Headless flux media client")]
struct Cli {
    /// Server URL, overriding config file and FLUX_SERVER_URL
    #[arg(long)]
    server: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the play order of a record, given its id or one of its videos
    Show { id: String },
    /// Print the watch URL a record would resume at
    Resume { record: String },
    /// Forget stored progress for a record
    Forget { record: String },
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("flux_player", LevelFilter::Debug)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();
    let mut config = Config::load();
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    if let Command::Config { save } = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        if save {
            config.save().context("saving configuration")?;
            if let Some(path) = Config::default_path() {
                println!("saved to {}", path.display());
            }
        }
        return Ok(());
    }

    let api = ApiClient::from_config(&config)?;
    match cli.command {
        Command::Show { id } => show(&api, &id).await,
        Command::Resume { record } => resume(&api, &RecordId::from(record)).await,
        Command::Forget { record } => {
            api.delete_playback(&RecordId::from(record)).await?;
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

async fn show(api: &ApiClient, id: &str) -> Result<()> {
    let record = api
        .fetch_record(id)
        .await
        .with_context(|| format!("fetching record for {id}"))?;
    let focus = VideoId::from(id);

    println!(
        "{} [{}] {}",
        record.id,
        record.record_type(),
        record.name.as_deref().unwrap_or("")
    );
    for (index, video) in record.videos().enumerate() {
        let marker = if video.id == focus { '>' } else { ' ' };
        println!(
            "{marker} {:>3}  {}  {}",
            index + 1,
            video.id,
            video.name.as_deref().unwrap_or("")
        );
    }

    if sequence::position(&record, &focus).is_some() {
        println!(
            "previous: {}  next: {}",
            sequence::previous(&record, &focus),
            sequence::next(&record, &focus)
        );
    }
    Ok(())
}

async fn resume(api: &ApiClient, record: &RecordId) -> Result<()> {
    let current = api.fetch_current_video(record).await?;
    let mut search = SearchParams::new().with(routes::PARAM_ID, current.video.id.as_str());
    let resume_at = current.resume_at();
    if resume_at > 0.0 {
        search.set(routes::PARAM_TIME, format!("{}", resume_at.round()));
    }
    let location = LocationState {
        pathname: routes::WATCH.to_string(),
        search,
    };
    println!("{}", location.to_url());
    Ok(())
}
