use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use directories::BaseDirs;
use miette::IntoDiagnostic;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use maplist_generator::app::{App, DEFAULT_PACING, FetchOptions};
use maplist_generator::domain::CollectionId;
use maplist_generator::error::{ErrorKind, MaplistError};
use maplist_generator::output::{JsonOutput, OutputMode, TextOutput};
use maplist_generator::settings::{Settings, SettingsStore};
use maplist_generator::steam::{ClientConfig, WorkshopHttpClient};

#[derive(Parser)]
#[command(name = "maplist")]
#[command(about = "Generate a sorted title:id map list from a Steam Workshop collection")]
#[command(version, author)]
struct Cli {
    /// Collection id or workshop URL; defaults to the last one used
    #[arg(short, long)]
    collection: Option<String>,

    /// Directory that receives maplist.txt; defaults to the last one used
    #[arg(short, long)]
    output: Option<String>,

    /// Pause between details requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Steam Web API base URL (also MAPLIST_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    #[arg(long)]
    json: bool,

    /// Do not remember collection and output directory for the next run
    #[arg(long)]
    no_remember: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<MaplistError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MaplistError) -> u8 {
    match error.kind() {
        ErrorKind::Input => 2,
        ErrorKind::Transport => 3,
        ErrorKind::MalformedResponse => 4,
        ErrorKind::Filesystem => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let settings_store =
        SettingsStore::locate_or_warn(BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()));
    let saved = SettingsStore::load_from(settings_store.as_ref());

    let raw_collection = cli
        .collection
        .or_else(|| saved.collection_id.clone())
        .ok_or(MaplistError::MissingCollectionId)?;
    let collection: CollectionId = raw_collection.parse()?;
    let output_dir = Utf8PathBuf::from(
        cli.output
            .or_else(|| saved.output_path.clone())
            .unwrap_or_else(|| ".".to_string()),
    );

    let api_base = cli
        .api_base
        .or_else(|| std::env::var("MAPLIST_API_BASE").ok())
        .filter(|value| !value.trim().is_empty());
    let config = match api_base {
        Some(base) => ClientConfig::with_api_base(&base),
        None => ClientConfig::default(),
    };
    let client = WorkshopHttpClient::with_config(config)?;
    let options = FetchOptions {
        pacing: cli
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PACING),
    };
    let app = App::new(client, options);

    match output_mode {
        OutputMode::Json => {
            let result = app.generate(&collection, &output_dir, &JsonOutput)?;
            JsonOutput::print_generate(&result).into_diagnostic()?;
        }
        OutputMode::Text => {
            let result = app.generate(&collection, &output_dir, &TextOutput)?;
            TextOutput::print_generate(&result).into_diagnostic()?;
        }
    }

    if let Some(settings_store) = settings_store.filter(|_| !cli.no_remember) {
        let settings = Settings {
            collection_id: Some(collection.to_string()),
            output_path: Some(output_dir.to_string()),
        };
        if let Err(err) = settings_store.save(&settings) {
            warn!(error = %err, path = %settings_store.path().display(), "could not save settings");
        }
    }

    Ok(())
}
