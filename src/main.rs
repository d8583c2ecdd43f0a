use sertest::cli::{self, Args};
use sertest::config::{Config, ConfigLoader};
use sertest::engine::StopFlag;
use sertest::settings::Settings;
use sertest::{logging, AppError};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// How long an interrupted loop gets to notice the stop request.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

// --- Main Application Entry Point ---
#[tokio::main]
async fn main() -> ExitCode {
    let program = std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "sertest".to_string());

    let args = match Args::parse_from_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => return report(&e, &program),
    };

    let config = match ConfigLoader::load() {
        Ok(loader) => loader.into_config(),
        Err(e) => {
            eprintln!("Warning: Failed to load config, using defaults: {e}");
            Config::default()
        }
    };

    logging::init(&config.logging, args.verbose);

    let settings = match args.into_settings(&config) {
        Ok(settings) => settings,
        Err(e) => return report(&e, &program),
    };

    if settings.verbose {
        println!("{}", settings.describe());
    }

    run_until_interrupted(settings, &program).await
}

/// Run the loop on a blocking thread and stop it on Ctrl+C or SIGTERM.
async fn run_until_interrupted(settings: Settings, program: &str) -> ExitCode {
    let stop = StopFlag::new();
    let worker_stop = stop.clone();
    let mut task = tokio::task::spawn_blocking(move || sertest::run(&settings, worker_stop));

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = shutdown_signal() => {
            stop.request_stop();
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    // Still parked in a blocking read; the kernel closes the
                    // descriptor when the process exits.
                    warn!("Loop did not stop within {:?}, exiting", SHUTDOWN_GRACE);
                    std::process::exit(0);
                }
            }
        }
    };

    match joined {
        Ok(Ok(summary)) => {
            info!(
                bytes = summary.bytes,
                mismatches = summary.mismatches,
                "{} stopped",
                summary.direction
            );
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => report(&e, program),
        Err(e) => {
            error!("Pattern loop panicked: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Print a diagnostic for `e` and return its exit status.
fn report(e: &AppError, program: &str) -> ExitCode {
    match e {
        AppError::Usage(message) => {
            if !message.is_empty() {
                eprintln!("{message}");
            }
            println!("{}", cli::usage(program));
        }
        AppError::NoMode => eprintln!("{e}"),
        _ => error!("{e}"),
    }
    e.exit_code()
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, stopping...");
}
