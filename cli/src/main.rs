use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing_subscriber::filter::EnvFilter;

use nabber_core::context::{AppConfig, AppConfigExt, ParsingSession, resolve_log_path};
use nabber_core::game_log::{LineParser, Rejection, read_full_log_file};
use nabber_core::handlers::SignalLogger;
use nabber_core::run_pipeline;

#[derive(Parser)]
#[command(version, about = "Omega Strikers match tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the game log live until Ctrl-C
    Watch {
        /// Log file; relative names are resolved against the log directory
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Skip lines already in the file and only follow new ones
        #[arg(long)]
        from_end: bool,
        /// Log lines that matched a pattern but failed to decode
        #[arg(long)]
        decode_errors: bool,
    },
    /// Parse a whole log file once and print its matches as JSON
    Replay {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Show how a single raw line is parsed
    Classify { line: String },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let cli = Cli::parse();
    let config = AppConfig::load();

    match cli.command.unwrap_or(Commands::Watch {
        file: None,
        from_end: false,
        decode_errors: false,
    }) {
        Commands::Watch {
            file,
            from_end,
            decode_errors,
        } => watch_log(&config, file, !from_end, decode_errors).await,
        Commands::Replay { file } => replay(&config, &file),
        Commands::Classify { line } => classify(&config, &line),
        Commands::Config => show_config(&config),
    }
}

async fn watch_log(
    config: &AppConfig,
    file: Option<PathBuf>,
    from_start: bool,
    decode_errors: bool,
) -> Result<(), String> {
    let path = match file {
        Some(file) => resolve_log_path(config, &file),
        None => config.default_log_path(),
    };
    let mut session = new_session(config, &path)?;
    session.add_signal_handler(Box::new(SignalLogger::with_decode_errors(decode_errors)));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    println!("tailing {}", path.display());
    let session = run_pipeline(session, config, from_start, shutdown_rx)
        .await
        .map_err(|e| e.to_string())?;

    let stats = session.stats();
    println!(
        "processed {} lines ({} classified, {} decode errors)",
        stats.lines, stats.classified, stats.decode_errors
    );
    Ok(())
}

fn replay(config: &AppConfig, file: &Path) -> Result<(), String> {
    let path = resolve_log_path(config, file);
    let mut session = new_session(config, &path)?;

    let timer = Instant::now();
    let snapshot = read_full_log_file(&path, &session.parser())
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let count = snapshot.lines.len();
    session.process_lines(snapshot.lines);
    tracing::info!(
        lines = count,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Replayed log file"
    );

    let matches: Vec<_> = session.session_cache.matches().collect();
    let json = serde_json::to_string_pretty(&matches).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn classify(config: &AppConfig, line: &str) -> Result<(), String> {
    let parser = LineParser::from_config(config).map_err(|e| e.to_string())?;
    match parser.inspect(1, line) {
        Ok(parsed) => {
            let json = serde_json::to_string_pretty(&parsed).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        Err(Rejection::Malformed) => println!("rejected: not a log line"),
        Err(Rejection::Noise) => println!("rejected: noise"),
    }
    Ok(())
}

fn show_config(config: &AppConfig) -> Result<(), String> {
    match AppConfig::config_path() {
        Ok(path) => println!("# {}", path.display()),
        Err(e) => tracing::warn!(error = %e, "Could not resolve config path"),
    }
    let json = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn new_session(config: &AppConfig, path: &Path) -> Result<ParsingSession, String> {
    let parser = LineParser::from_config(config).map_err(|e| e.to_string())?;
    Ok(ParsingSession::new(
        path.to_path_buf(),
        Arc::new(parser),
        config.history_capacity,
    ))
}

/// Initialize logging, writing to NABBER_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("NABBER_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
