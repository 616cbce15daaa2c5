//! ARV Adherence: viral-suppression prediction for clients on ART.
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arv_adherence::adapters::sanitize::SanitizingMakeWriter;
use arv_adherence::config::{AppConfig, LogMode};
use arv_adherence::tui::App;
use arv_adherence::OutcomeMessage;

fn main() -> Result<ExitCode> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", OutcomeMessage::fatal(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    // Logs written to the terminal would corrupt the TUI's alternate screen.
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => std::io::stdout().is_terminal(),
    };

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!("Starting ARV Adherence...");

    let mut app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            eprintln!("{}", OutcomeMessage::fatal(format!("{e:#}")));
            return Ok(ExitCode::FAILURE);
        }
    };
    app.run()?;

    tracing::info!("ARV Adherence shutdown complete.");
    Ok(ExitCode::SUCCESS)
}
