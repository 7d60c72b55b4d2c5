use clap::{Parser, Subcommand};
use depreciation_lib::{
    delete_assets, get_assets, get_settings, parse_payload, save_asset, save_settings,
    Result,
};
use serde_json::Value;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "depreciation", version, about = "Monthly asset depreciation schedules")]
struct Cli {
    /// Directory holding depreciation.db and settings.json
    #[arg(long = "data-dir", env = "DEPRECIATION_DATA_DIR", default_value = ".depreciation")]
    data_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and store a schedule from a JSON asset payload
    Save {
        /// Inline JSON payload (read from --file or stdin when omitted)
        payload: Option<String>,

        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
    },
    /// List every stored depreciation row
    List,
    /// Delete every stored depreciation row
    Delete,
    /// Show settings, or merge a partial JSON object into them
    Settings {
        #[arg(long = "set")]
        set: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(out) => {
                println!("{out}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_validation() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<Value> {
    match cli.command {
        Command::Save { payload, file } => {
            let raw = match (payload, file) {
                (Some(inline), _) => inline,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => io::read_to_string(io::stdin())?,
            };
            save_asset(cli.data_dir, parse_payload(&raw)?).await
        }
        Command::List => get_assets(cli.data_dir).await,
        Command::Delete => delete_assets(cli.data_dir).await,
        Command::Settings { set: Some(raw) } => {
            save_settings(cli.data_dir, parse_payload(&raw)?).await
        }
        Command::Settings { set: None } => get_settings(cli.data_dir).await,
    }
}

