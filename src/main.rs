use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Client;
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tablepaste::{
    config::Config,
    export::{render_table, to_data_uri, to_json},
    input::load_payload,
    upload::{access_token_from_redirect, authorize_url, DropboxClient, UploadError},
    Dispatcher, PreviewState, ViewMode,
};

#[derive(Parser, Debug)]
#[command(name = "tablepaste", about = "Paste a table, preview it, save it as JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse pasted content and print it as a table or JSON
    Parse {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = View::Table)]
        view: View,
    },
    /// Print the JSON as a data: URI for a save picker
    DataUri {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Upload the JSON to Dropbox as table-data.json
    Upload {
        #[command(flatten)]
        input: InputArgs,

        /// Dropbox folder, overrides TABLEPASTE_UPLOAD_PATH
        #[arg(long)]
        folder: Option<String>,
    },
    /// Print the Dropbox authorization URL
    Authorize,
    /// Recover the access token from the URL Dropbox redirected to
    Token { redirect_url: String },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Plain-text paste; read from stdin when omitted
    #[arg(long)]
    text: Option<PathBuf>,

    /// HTML flavour of the same paste
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum View {
    Table,
    Json,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Table => ViewMode::Table,
            View::Json => ViewMode::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Parse { input, view } => {
            let state = preview(&input)?.with_view(view.into());
            print_preview(&state)
        }
        Command::DataUri { input } => {
            let state = preview(&input)?;
            if let Some(code) = report_error(&state) {
                return Ok(code);
            }
            println!("{}", to_data_uri(&to_json(&state.rows)?));
            Ok(ExitCode::SUCCESS)
        }
        Command::Upload { input, folder } => {
            let state = preview(&input)?;
            if let Some(code) = report_error(&state) {
                return Ok(code);
            }
            let folder = folder.unwrap_or_else(|| config.upload_path.clone());
            upload(&config, &state, &folder).await
        }
        Command::Authorize => {
            let app_key = config.app_key.as_deref().with_context(|| {
                "Dropbox is not configured. Set TABLEPASTE_DROPBOX_APP_KEY to a valid App Key."
            })?;
            println!("{}", authorize_url(app_key, &config.redirect_uri)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Token { redirect_url } => {
            let token = access_token_from_redirect(&redirect_url)?;
            println!("{}", token);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn preview(input: &InputArgs) -> Result<PreviewState> {
    let payload = load_payload(input.text.as_deref(), input.html.as_deref())?;
    let outcome = Dispatcher::default().dispatch(&payload);
    Ok(PreviewState::default().apply(outcome))
}

fn report_error(state: &PreviewState) -> Option<ExitCode> {
    let message = state.error.as_deref()?;
    eprintln!("{}", message);
    Some(ExitCode::FAILURE)
}

fn print_preview(state: &PreviewState) -> Result<ExitCode> {
    if let Some(code) = report_error(state) {
        return Ok(code);
    }
    if !state.has_data() {
        println!("No data to display");
        return Ok(ExitCode::SUCCESS);
    }
    match state.view {
        ViewMode::Table => print!("{}", render_table(&state.headers, &state.rows)),
        ViewMode::Json => println!("{}", to_json(&state.rows)?),
    }
    Ok(ExitCode::SUCCESS)
}

async fn upload(config: &Config, state: &PreviewState, folder: &str) -> Result<ExitCode> {
    let Some(app_key) = config.app_key.as_deref() else {
        error!("Dropbox is not configured");
        eprintln!("Dropbox is not configured. Set TABLEPASTE_DROPBOX_APP_KEY to a valid App Key.");
        return Ok(ExitCode::FAILURE);
    };
    let Some(token) = config.access_token.as_deref() else {
        info!("no access token, authorization required");
        println!("Authorize first: {}", authorize_url(app_key, &config.redirect_uri)?);
        return Ok(ExitCode::FAILURE);
    };

    let client = DropboxClient::new(Client::new(), token);
    match client.upload_preview(state, folder).await {
        Ok(path) => {
            println!("Uploaded {}", path);
            Ok(ExitCode::SUCCESS)
        }
        Err(UploadError::TokenExpired) => {
            warn!("access token expired or invalid");
            eprintln!("{}", UploadError::TokenExpired);
            println!("Re-authorize: {}", authorize_url(app_key, &config.redirect_uri)?);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("uploading to Dropbox"),
    }
}
