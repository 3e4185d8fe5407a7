//! smbmetricsd - Prometheus exporter for Samba file servers.
//!
//! Serves `smb_*` gauges describing SMB sessions, shares and the resource
//! usage of the `smbd` worker processes. All values are computed on scrape.

mod handlers;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::net::SocketAddr;
use std::process;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use prometheus::Registry;
use tower_http::compression::CompressionLayer;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use smbmetrics_core::collector::{RealFs, SystemCommand};
use smbmetrics_core::config::{ExporterConfig, NetAttribution};
use smbmetrics_core::exporter::register_collectors;

/// Prometheus exporter for Samba.
#[derive(Parser)]
#[command(name = "smbmetricsd", about = "Prometheus exporter for Samba", version = smbmetrics_core::VERSION)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080", env = "SMBMETRICS_LISTEN")]
    listen: SocketAddr,

    /// Name of the worker processes to sample.
    #[arg(long, default_value = "smbd", env = "SMBMETRICS_PROCESS_NAME")]
    process_name: String,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc", env = "SMBMETRICS_PROC_PATH")]
    proc_path: String,

    /// pgrep executable used for worker discovery.
    #[arg(long, default_value = "pgrep", env = "SMBMETRICS_PGREP")]
    pgrep: String,

    /// smbstatus executable.
    #[arg(long, default_value = "smbstatus", env = "SMBMETRICS_SMBSTATUS")]
    smbstatus: String,

    /// smbd executable, queried for the Samba version.
    #[arg(long, default_value = "smbd", env = "SMBMETRICS_SMBD")]
    smbd: String,

    /// ctdb executable, queried for the CTDB version.
    #[arg(long, default_value = "ctdb", env = "SMBMETRICS_CTDB")]
    ctdb: String,

    /// Container image running Samba (reported as the `sambaimage` label).
    #[arg(long, env = "SMBMETRICS_SAMBA_IMAGE")]
    samba_image: Option<String>,

    /// How host network counters are attributed: per-scrape or per-process.
    #[arg(long, default_value = "per-scrape", env = "SMBMETRICS_NET_ATTRIBUTION")]
    net_attribution: NetAttribution,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn exporter_config(&self) -> ExporterConfig {
        ExporterConfig {
            process_name: self.process_name.clone(),
            proc_path: self.proc_path.clone(),
            pgrep_path: self.pgrep.clone(),
            smbstatus_path: self.smbstatus.clone(),
            smbd_path: self.smbd.clone(),
            ctdb_path: self.ctdb.clone(),
            samba_image: self.samba_image.clone(),
            net_attribution: self.net_attribution,
        }
    }
}

/// Installs the tracing subscriber. INFO by default, ERROR with `-q`.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["smbmetricsd", "smbmetrics_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };
    runtime.block_on(async_main(args));
}

async fn async_main(args: Args) {
    let config = args.exporter_config();
    info!(
        version = smbmetrics_core::VERSION,
        commit = smbmetrics_core::COMMIT_ID,
        "smbmetricsd starting"
    );
    info!(
        process = %config.process_name,
        proc = %config.proc_path,
        net_attribution = %config.net_attribution,
        "config"
    );

    let registry = Registry::new();
    if let Err(e) = register_collectors(&registry, RealFs, SystemCommand, &config) {
        error!(error = %e, "failed to register collectors");
        process::exit(1);
    }

    let app = Router::new()
        .route("/metrics", get(handlers::handle_metrics))
        .route("/health", get(handlers::handle_health))
        .with_state(registry)
        .layer(CompressionLayer::new());

    let listener = match tokio::net::TcpListener::bind(args.listen).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %args.listen, error = %e, "failed to bind");
            process::exit(1);
        }
    };
    info!(addr = %args.listen, "listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        process::exit(1);
    }
    info!("shut down");
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
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
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["smbmetricsd"]).unwrap();
        assert_eq!(args.listen, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(args.exporter_config(), ExporterConfig::default());
    }

    #[test]
    fn test_args_to_config() {
        let args = Args::try_parse_from([
            "smbmetricsd",
            "--process-name",
            "samba-dcerpcd",
            "--proc-path",
            "/host/proc",
            "--samba-image",
            "quay.io/samba.org/samba-server:latest",
            "--net-attribution",
            "per-process",
        ])
        .unwrap();
        let config = args.exporter_config();
        assert_eq!(config.process_name, "samba-dcerpcd");
        assert_eq!(config.proc_path, "/host/proc");
        assert_eq!(
            config.samba_image.as_deref(),
            Some("quay.io/samba.org/samba-server:latest")
        );
        assert_eq!(config.net_attribution, NetAttribution::PerProcess);
    }

    #[test]
    fn test_bad_net_attribution_rejected() {
        assert!(Args::try_parse_from(["smbmetricsd", "--net-attribution", "sometimes"]).is_err());
    }

    #[test]
    fn test_verbosity_count() {
        let args = Args::try_parse_from(["smbmetricsd", "-vv", "-q"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(args.quiet);
    }
}
