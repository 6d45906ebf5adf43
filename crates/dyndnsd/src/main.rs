// # dyndnsd - Cloudflare dynamic DNS daemon
//
// A thin integration layer. All reconcile logic lives in dyndns-core.
//
// The daemon is responsible for:
// 1. Reading configuration from the environment (and an optional `.env` file)
// 2. Setting up console and file logging
// 3. Building the Cloudflare client and the HTTP IP resolver
// 4. Resolving the managed record, then running the reconcile loop until
//    SIGINT or SIGTERM
//
// ## Configuration
//
// - `CLOUDFLARE_API_TOKEN`: API token with Zone:DNS:Edit permission (required)
// - `ZONE_ID`: Zone containing the record (required)
// - `DNS_RECORD_ID`: Record to manage; looked up by name when unset
// - `DOMAIN_NAME`: Record name; required when `DNS_RECORD_ID` is unset
// - `RECORD_TYPE`: Record type (default `A`)
// - `TTL`: Record TTL in seconds (default 3600)
// - `PROXIED`: `true` to proxy through Cloudflare (default false)
// - `CHECK_INTERVAL`: Seconds between checks (default 300)
// - `IP_ECHO_URL`: Public IP echo service (default https://api.ipify.org)
// - `LOG_FILE`: Persistent log file (default cf_dyndns.log)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=...
// export ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export DOMAIN_NAME=home.example.com
//
// dyndnsd
// ```

mod config;
mod logging;

use anyhow::Result;
use config::Config;
use dyndns_core::{DdnsConfig, DnsRecordClient, ReconcileConfig, ReconcileEvent, Reconciler, resolve_target};
use dyndns_ip_http::HttpIpResolver;
use dyndns_provider_cloudflare::CloudflareClient;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if let Err(e) = logging::init(logging::parse_level(&config.log_level), &config.log_file) {
        eprintln!("Logging setup error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd daemon");
    debug!("Configuration loaded: {:?}", config);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Run the daemon until shutdown
async fn run_daemon(config: Config) -> DdnsExitCode {
    // Handlers are installed before the first network call so an early
    // interrupt is not lost
    let shutdown = match shutdown_signal() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            error!("Daemon error: {:#}", e);
            return DdnsExitCode::RuntimeError;
        }
    };

    let client = match CloudflareClient::new(config.api_token.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create Cloudflare client: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let resolver = match HttpIpResolver::new(config.ip_echo_url.clone()) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to create IP resolver: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };
    info!("Using IP echo service {}", resolver.url());

    tokio::pin!(shutdown);

    let reconcile_config =
        match resolve_startup(&client, config.ddns_config(), &mut shutdown).await {
            Ok(resolved) => resolved,
            Err(code) => return code,
        };

    let (reconciler, event_rx) =
        match Reconciler::new(Box::new(resolver), Box::new(client), reconcile_config) {
            Ok(pair) => pair,
            Err(e) => {
                error!("Failed to create reconciler: {}", e);
                return DdnsExitCode::ConfigError;
            }
        };

    let events = tokio::spawn(log_events(event_rx));

    reconciler.run_until(&mut shutdown).await;

    // Dropping the reconciler closes the channel and ends the event task
    drop(reconciler);
    if let Err(e) = events.await {
        error!("Event logger failed: {}", e);
        return DdnsExitCode::RuntimeError;
    }

    info!("Interrupted. Exiting...");
    DdnsExitCode::CleanShutdown
}

/// Pin down the managed record before the loop starts
///
/// Returns the exit code to stop with when startup fails or is interrupted.
async fn resolve_startup<F>(
    client: &dyn DnsRecordClient,
    config: DdnsConfig,
    shutdown: F,
) -> std::result::Result<ReconcileConfig, DdnsExitCode>
where
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;

        _ = shutdown => {
            info!("Interrupted during startup. Exiting...");
            Err(DdnsExitCode::CleanShutdown)
        }

        result = resolve_target(client, config) => result.map_err(|e| {
            error!("Startup failed: {}", e);
            if e.is_fatal() {
                DdnsExitCode::ConfigError
            } else {
                DdnsExitCode::RuntimeError
            }
        }),
    }
}

/// Trace loop events at debug level
async fn log_events(mut event_rx: mpsc::Receiver<ReconcileEvent>) {
    while let Some(event) = event_rx.recv().await {
        debug!("Reconcile event: {:?}", event);
    }
}

/// Install SIGTERM and SIGINT handlers
///
/// Returns a future that resolves on the first signal received.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Install a Ctrl-C handler
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
}
