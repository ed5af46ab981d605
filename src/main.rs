//! vmoused - Virtual Mouse Daemon
//!
//! Entry point for the daemon binary.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vmoused::config::{Config, LoggingConfig};
use vmoused::daemon::Daemon;
use vmoused::device::keyboard::list_devices;

/// Command-line arguments for vmoused
#[derive(Parser, Debug)]
#[command(name = "vmoused")]
#[command(version, about = "Virtual mouse daemon - keyboard-driven pointer control", long_about = None)]
pub struct Args {
    /// Configuration file path (default: user config dir, then /etc/vmoused/config.toml)
    #[arg(short, long, env = "VMOUSED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Source keyboard device (repeatable; overrides autodetection)
    #[arg(short, long = "device")]
    pub devices: Vec<PathBuf>,

    /// Do not grab the source keyboards (managed keys stay visible to other programs)
    #[arg(long)]
    pub no_grab: bool,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "compact")]
    pub log_format: String,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default_locations()?,
    };
    let config = config.with_overrides(args.devices.clone(), args.no_grab);

    // Initialize logging
    init_logging(&args, &config.logging)?;

    if args.list_devices {
        for dev in list_devices() {
            println!(
                "{}  {}  [{}]",
                dev.path.display(),
                dev.name,
                if dev.keyboard { "keyboard" } else { "other" }
            );
        }
        return Ok(());
    }

    info!("════════════════════════════════════════════════════════");
    info!("  vmoused v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {}  Commit: {}", env!("BUILD_DATE"), env!("GIT_HASH"));
    info!("════════════════════════════════════════════════════════");

    vmoused::utils::log_startup_diagnostics();
    tracing::debug!("Config: {:?}", config);

    let daemon = Daemon::new(config);
    if let Err(e) = daemon.run().await {
        eprintln!("{}", vmoused::utils::format_user_error(&e));
        return Err(e);
    }

    info!("vmoused shut down");
    Ok(())
}

fn init_logging(args: &Args, logging: &LoggingConfig) -> Result<()> {
    use std::fs::File;

    // CLI verbosity wins over the config file level.
    let log_level = match args.verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("vmoused={log_level},warn"))
        });

    // If log file is specified, write to both stdout and file
    if let Some(log_file_path) = &args.log_file {
        let file = File::create(log_file_path)?;

        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stdout),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "pretty" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stdout),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stdout),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path.display());
    } else {
        // Stdout only
        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json())
                    .init();
            }
            "pretty" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().compact())
                    .init();
            }
        }
    }

    Ok(())
}
