use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bw_tui::app::{self, App};
use bw_tui::clipboard::SystemClipboard;
use bw_tui::config::{self, Config};
use bw_tui::session::{self, ProcessCommandRunner, VaultSession};

const LOG_ENV: &str = "BW_TUI_LOG";

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main() -> Result<ExitCode> {
    let cfg = Config::load()?;
    init_logging(&cfg);

    if let Err(e) = session::preflight(&ProcessCommandRunner, &cfg.binary) {
        warn!(error = %e, "pre-flight failed");
        eprintln!(
            "Could not find '{}' command in '$PATH'. Please check if Bitwarden CLI is installed.",
            cfg.binary
        );
        return Ok(ExitCode::FAILURE);
    }

    let session = VaultSession::new(
        Box::new(ProcessCommandRunner),
        cfg.binary.clone(),
        config::session_from_env(),
    );
    let app = App::start(session, Box::new(SystemClipboard::new()), cfg.flash_ticks())?;
    app::run(app)?;
    info!("exiting");
    Ok(ExitCode::SUCCESS)
}

/// Logs go to a file since the terminal belongs to the UI. Any failure here
/// just leaves logging off.
fn init_logging(cfg: &Config) {
    let Some(path) = cfg.log_path() else {
        return;
    };
    if config::ensure_parent_dir(&path).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init();
}
