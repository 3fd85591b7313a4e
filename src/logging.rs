//! Logging setup for the taskexec CLI
//!
//! Library crates only emit `tracing` events; the binary installs the
//! subscriber. Logs go to stderr so stdout carries nothing but task output.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is unset or invalid.
#[must_use]
pub const fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "taskexec=debug,info"
    } else {
        "taskexec=info,warn"
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the defaults. Verbose mode adds event
/// targets and logs span close timings.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(verbose)
        .with_line_number(false)
        .with_file(false)
        .with_span_events(if verbose { FmtSpan::CLOSE } else { FmtSpan::NONE })
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    Ok(())
}
