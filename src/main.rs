//! idlewatch - idle/activity watcher daemon
//!
//! Reads interaction event names from stdin, one per line, and feeds them to
//! an idle detector and an active detector running on the tokio clock.
//! Every transition is logged and appended to a daily JSONL file.

mod logging;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing::{info, warn};

use idlewatch::{ActiveDetector, ActivityState, Config, EventTarget, Host, IdleDetector, TokioClock};

use crate::logging::JsonlLogger;

/// Application version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // Parse command line arguments
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    // Load configuration
    let config = Config::load(config_path.as_deref())?;
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.logging.level)?;

    info!("Starting idlewatch v{}", VERSION);

    // Detectors are single-threaded, so everything runs on one local set
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;
    LocalSet::new().block_on(&runtime, run(config))?;

    info!("idlewatch shutdown complete");
    Ok(())
}

/// Watch stdin until it closes or the process is interrupted.
async fn run(config: Config) -> Result<()> {
    info!(
        "Configuration loaded: timeout={}x{}ms, repeat={}, immediate={}",
        config.timeout.period_count,
        config.timeout.unit_ms,
        config.idle.repeat,
        config.active.immediate
    );

    let mut jsonl_logger = JsonlLogger::new(config.logging.logs_dir())?;
    jsonl_logger.log_session_start(VERSION)?;

    let document = Rc::new(EventTarget::new("document"));
    let host = Host::new(Rc::new(TokioClock::new()), document.clone());

    let idle = IdleDetector::from_config(&host, &config);
    let active = ActiveDetector::from_config(&host, &config);
    let mut idle_rx = idle.subscribe();
    let mut active_rx = active.subscribe();

    idle.start().context("Idle detector has nothing to watch")?;
    active.start().context("Active detector has nothing to watch")?;

    let timeout_ms = config.timeout.timeout().interval().as_millis() as u64;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interactions: u64 = 0;

    info!("Reading interaction events from stdin into {}", document.name());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        let event = line.trim();
                        if event.is_empty() {
                            continue;
                        }
                        interactions += 1;
                        document.dispatch(event);
                    }
                    None => {
                        info!("Input closed");
                        break;
                    }
                }
            }
            Ok(state) = idle_rx.recv() => {
                if let ActivityState::Idle { since } = state {
                    info!("Surface idle since {}", since);
                    if let Err(e) = jsonl_logger.log_went_idle(since, timeout_ms) {
                        warn!("Failed to log transition: {}", e);
                    }
                }
            }
            Ok(state) = active_rx.recv() => {
                if state == ActivityState::Active {
                    info!("Surface active");
                    if let Err(e) = jsonl_logger.log_became_active() {
                        warn!("Failed to log transition: {}", e);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                break;
            }
        }
    }

    // Cleanup
    idle.stop();
    active.stop();
    jsonl_logger.log_session_end(interactions)?;

    info!("Observed {} interactions total", interactions);
    Ok(())
}

/// Initialize tracing subscriber with the given log level.
fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
