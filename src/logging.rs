use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const LEVELS: [LevelFilter; 6] =
    [LevelFilter::OFF, LevelFilter::ERROR, LevelFilter::WARN, LevelFilter::INFO, LevelFilter::DEBUG, LevelFilter::TRACE];

/// Moves `level` up one step per `-v` and down one per `-q`, clamped to the
/// range from off to trace.
pub fn adjust(level: Level, verbose: u8, quiet: u8) -> LevelFilter {
    let base = LEVELS.iter().position(|filter| *filter == LevelFilter::from_level(level)).unwrap_or(3);
    let index = (base + usize::from(verbose)).saturating_sub(usize::from(quiet)).min(LEVELS.len() - 1);
    LEVELS[index]
}

/// Sends log output to stderr. `RUST_LOG`, when set, replaces the level.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    if let Err(err) = result {
        eprintln!("Logging is unavailable: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Level::INFO, 0, 0, LevelFilter::INFO)]
    #[case(Level::INFO, 1, 0, LevelFilter::DEBUG)]
    #[case(Level::INFO, 5, 0, LevelFilter::TRACE)]
    #[case(Level::INFO, 0, 1, LevelFilter::WARN)]
    #[case(Level::WARN, 0, 9, LevelFilter::OFF)]
    #[case(Level::ERROR, 1, 1, LevelFilter::ERROR)]
    fn verbosity(#[case] level: Level, #[case] verbose: u8, #[case] quiet: u8, #[case] expected: LevelFilter) {
        assert_eq!(adjust(level, verbose, quiet), expected);
    }
}
