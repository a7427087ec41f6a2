use std::str::FromStr;
use tracing::Level;

// LMS_LOG_LEVEL picks the verbosity, e.g. "debug" to see every staged write.
pub fn log_level() -> Level {
    std::env::var("LMS_LOG_LEVEL").ok()
        .and_then(|level| Level::from_str(level.trim()).ok())
        .unwrap_or(Level::INFO)
}

// JSON lines for CloudWatch; the runtime adds the ingestion time.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(log_level())
        .with_target(false)
        // ANSI colour codes come out as noise in CloudWatch
        .with_ansi(false)
        .without_time()
        .json()
        .init();
}
