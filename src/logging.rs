use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Initializes the `tracing` logger, writing to stderr.
pub fn init(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Log level: {level}");
}
