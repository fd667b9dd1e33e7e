use tracing_subscriber::{filter, prelude::*};

/// Installs a global subscriber which prints all events up to the given level to stdout.
///
/// Returns `false` if another subscriber has already been installed.
pub fn init_tracing(level: filter::LevelFilter) -> bool {
    let stdout_log = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_level(true)
        .with_target(false);
    tracing_subscriber::registry()
        .with(stdout_log.with_filter(level))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn second_initialization_is_refused() {
        // Other tests may have installed a subscriber already
        let _ = init_tracing(filter::LevelFilter::WARN);
        assert!(!init_tracing(filter::LevelFilter::DEBUG));
    }
}
