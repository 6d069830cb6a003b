use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

enum LogFilter {
    /// Directives taken verbatim from `RUST_LOG`.
    Env(EnvFilter),
    /// This crate's warnings, or debug with `--verbose`.
    Crate(Targets),
}

fn crate_targets(verbose: bool) -> Targets {
    let (crate_level, http_level) = if verbose {
        (LevelFilter::DEBUG, LevelFilter::INFO)
    } else {
        (LevelFilter::WARN, LevelFilter::OFF)
    };
    Targets::new()
        .with_target(env!("CARGO_CRATE_NAME"), crate_level)
        .with_target("reqwest", http_level)
}

fn select_filter(verbose: bool, rust_log: Option<&str>) -> LogFilter {
    match rust_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => LogFilter::Env(EnvFilter::new(directives)),
        None => LogFilter::Crate(crate_targets(verbose)),
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// A non-empty `RUST_LOG` replaces the built-in filter entirely. Otherwise
/// only this crate's warnings get through (dropped quote rows, failed
/// fetches), or its debug output with `verbose`.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let registry = tracing_subscriber::registry().with(
        fmt::layer()
            .pretty()
            .without_time()
            .with_writer(std::io::stderr),
    );

    match select_filter(verbose, rust_log.as_deref()) {
        LogFilter::Env(filter) => registry.with(filter).init(),
        LogFilter::Crate(targets) => registry.with(targets).init(),
    }
}
