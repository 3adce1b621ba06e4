use std::process::ExitCode;

use tracing::{error, info, warn};

use gateway::config::{Config, ConfigError};
use gateway::health::HealthChecker;
use gateway::observability::Telemetry;
use gateway::{logging, Server};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> ExitCode {
    // Logging is not installed yet, so startup errors go to stderr.
    let (config, checker) = match load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(config, checker)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<(Config, HealthChecker), ConfigError> {
    let config = Config::from_env()?;
    let checker = HealthChecker::from_config(&config.readiness)?;
    Ok((config, checker))
}

async fn async_main(config: Config, checker: HealthChecker) -> Result<(), BoxError> {
    // The batch span processor spawns onto the runtime, so this runs inside it.
    let telemetry = Telemetry::init(&config.telemetry)
        .map_err(|e| format!("failed to initialize trace export: {}", e))?;

    logging::init(&config.logging, &config.app_name, &telemetry)?;

    info!(version = %gateway::version(), "Starting {}...", config.app_name);
    config.log_summary();
    telemetry.log_status(&config.telemetry);

    // Informational only: readiness is decided per request.
    if let Some(result) = checker.ping_dependency().await {
        let name = checker.dependency_name().unwrap_or("dependency");
        match result {
            Ok(()) => info!(dependency = name, "Connected to Redis"),
            Err(e) => warn!(dependency = name, error = %e, "Redis not reachable at startup"),
        }
    }

    let server = match Server::bind(&config.server, checker).await {
        Ok(server) => server,
        Err(e) => {
            error!(
                addr = %config.server.display_addr(),
                error = %e,
                "Failed to bind listener"
            );
            telemetry.shutdown().await;
            return Err(e.into());
        }
    };

    let result = server.run(shutdown_signal()).await;

    if let Err(ref e) = result {
        error!(error = %e, "Server error");
    }

    telemetry.shutdown().await;
    info!("Shutdown complete");

    result.map_err(Into::into)
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
