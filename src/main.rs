use clap::Parser;
use env_logger::{Builder, WriteStyle};
use jetsnap::config::AppConfig;
use std::path::PathBuf;

/// Print a one-shot JSON telemetry snapshot of the local Jetson board.
#[derive(Parser, Debug)]
#[command(name = "jetsnap", version)]
struct Cli {
    /// Enable jetson_clocks and set to boot
    #[arg(long)]
    enable_clocks: bool,

    /// Set NVP Model by name or ID
    #[arg(long, value_name = "MODEL")]
    set_nvpmodel: Option<String>,

    /// Alternate INI configuration file (default: ./config.ini)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration first (without logging)
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::new(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        // Fall back to default configuration
        AppConfig::default()
    });

    // Initialise logger with a configured log level; logs go to stderr so
    // stdout stays a single JSON document.
    Builder::new()
        .filter_level(config.get_log_level())
        .write_style(WriteStyle::Always)
        .format_timestamp_secs()
        .init();

    let result = jetsnap::run(&config, cli.enable_clocks, cli.set_nvpmodel.as_deref()).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string())
    );
}
