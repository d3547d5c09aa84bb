use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the stderr subscriber; `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init()
        .ok();
}
