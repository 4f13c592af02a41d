//! Listen address resolution and log subscriber setup.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:10000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Resolve the REST listen address.
///
/// Explicit flag, then `RENTSCOUT_ADDR`, then `0.0.0.0:$PORT` for hosted
/// deployments, then [`DEFAULT_LISTEN_ADDR`].
pub fn resolve_listen_addr(explicit: Option<&str>) -> String {
    resolve_listen_addr_with(explicit, |k| std::env::var(k).ok())
}

pub fn resolve_listen_addr_with<F>(explicit: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = explicit {
        return addr.to_string();
    }

    if let Some(addr) = lookup("RENTSCOUT_ADDR").filter(|a| !a.trim().is_empty()) {
        return addr.trim().to_string();
    }

    if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
        return format!("0.0.0.0:{port}");
    }

    DEFAULT_LISTEN_ADDR.to_string()
}

/// Install the global subscriber on stderr. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
