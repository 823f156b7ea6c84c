//! Runtime setup for the binary

use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber, which also receives `log` records.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-v`. Output goes to
/// stderr so stdout carries only the report.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Note: logging already configured: {e}");
    }
}
