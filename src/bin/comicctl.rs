use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comic_image_proxy::{
    AppResult, Config, GenerateOutcome, GeneratedImage, HistoryStore, Orchestrator, ProxyClient,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "comicctl", about = "CLI for the Comic Image Generator", version)]
struct Cli {
    /// Override COMIC_API_URL
    #[arg(global = true, long)]
    api_url: Option<String>,

    /// Override DATA_DIR (history snapshot and downloads)
    #[arg(global = true, long)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enhance a description and generate a comic image from it
    Generate {
        /// Free-text description of the image
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Also download the image once generated
        #[arg(long)]
        download: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recent generations, newest first
    History {
        /// Output raw JSON instead of pretty lines
        #[arg(long)]
        json: bool,
        /// Remove the stored history
        #[arg(long, conflicts_with = "json")]
        clear: bool,
    },
    /// Download a generation from history
    Download {
        /// History position, 0 is the newest
        #[arg(default_value_t = 0)]
        index: usize,
        /// Output directory (defaults to <DATA_DIR>/images)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    let mut conf = Config::new()?;
    if let Some(url) = cli.api_url {
        conf.api_url = url;
    }
    if let Some(dir) = cli.data_dir {
        conf.data_dir = dir;
    }

    let download_dir = match &cli.command {
        Commands::Download { out: Some(dir), .. } => dir.clone(),
        _ => conf.download_dir(),
    };
    let store = HistoryStore::new(conf.history_path());
    let client = ProxyClient::new(conf.api_url.clone());
    let orchestrator = Orchestrator::new(client, store, download_dir).await;

    match cli.command {
        Commands::Generate { description, download, json } => {
            let description = description.join(" ");
            orchestrator.set_input(&description).await;
            match orchestrator.generate(&description).await {
                GenerateOutcome::Completed(image) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&image)?);
                    } else {
                        print_image(&image);
                    }
                    if download {
                        let name = image.download_name();
                        let result = orchestrator.download(image.url(), &name).await;
                        finish_download(&result);
                    }
                    Ok(())
                }
                GenerateOutcome::Failed(message) => {
                    eprintln!("Error: {}", message);
                    std::process::exit(1);
                }
                GenerateOutcome::Ignored => {
                    eprintln!("Nothing to generate: description is empty");
                    std::process::exit(2);
                }
            }
        }
        Commands::History { json, clear } => {
            if clear {
                orchestrator.clear_history().await?;
                println!("History cleared");
                return Ok(());
            }
            let state = orchestrator.state().await;
            if json {
                println!("{}", serde_json::to_string_pretty(state.history())?);
            } else if state.history().is_empty() {
                eprintln!("No generations yet");
            } else {
                for (index, image) in state.history().iter().enumerate() {
                    println!("[{}] {}  {}", index, image.timestamp(), image.prompt());
                    println!("    {}", image.url());
                }
            }
            Ok(())
        }
        Commands::Download { index, .. } => {
            let Some(image) = orchestrator.select(index).await else {
                eprintln!("No history entry at index {}", index);
                std::process::exit(2);
            };
            let result = orchestrator.download(image.url(), &image.download_name()).await;
            finish_download(&result);
            Ok(())
        }
    }
}

fn print_image(image: &GeneratedImage) {
    println!("Image URL:       {}", image.url());
    println!("Original Prompt: {}", image.prompt());
    println!("Enhanced Prompt: {}", image.enhanced_prompt());
}

/// Exit code and message for a finished download.
fn download_report(result: &AppResult<PathBuf>) -> (i32, String) {
    match result {
        Ok(path) => (0, format!("Saved {}", path.display())),
        Err(e) => (1, format!("Error: {}", e)),
    }
}

/// Print the download outcome, exiting with status 1 on failure.
fn finish_download(result: &AppResult<PathBuf>) {
    match download_report(result) {
        (0, line) => println!("{}", line),
        (code, line) => {
            eprintln!("{}", line);
            std::process::exit(code);
        }
    }
}
