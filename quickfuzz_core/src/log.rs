use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Manual manage the logging behavior of quickfuzz. Log messages always go to stderr so they
/// never mix with the payload report on stdout.
#[derive(Clone, Debug)]
pub struct Logger {
    level_filter: LevelFilter,
}

impl Logger {
    /// Initializes the global `tracing` subscriber. Does nothing but return the logger if a
    /// subscriber was already installed.
    #[must_use]
    pub fn init(verbose: bool) -> Self {
        let mut level_filter = LevelFilter::INFO;
        if verbose {
            level_filter = LevelFilter::DEBUG;
        }

        let fmt_logger = tracing_subscriber::fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(level_filter);

        if tracing_subscriber::registry()
            .with(fmt_logger)
            .try_init()
            .is_err()
        {
            tracing::debug!("Logger already initialized");
        }

        Self { level_filter }
    }

    /// The active log level
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level_filter
    }
}
