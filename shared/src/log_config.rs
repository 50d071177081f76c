use core::fmt;
use std::fmt::Display;

use clap_verbosity_flag::{InfoLevel, LevelFilter, Verbosity};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(clap::Parser, Clone)]
pub struct LogConfig {
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    #[clap(long, env, default_value_t = LogFormat::Text, help = "Logging format")]
    pub log_format: LogFormat,

    #[clap(
        long,
        env = "RUST_LOG",
        help = "Per-target filter directives, e.g. `webserver=debug`"
    )]
    pub log_filter: Option<String>,
}

impl LogConfig {
    pub fn level(&self) -> Option<Level> {
        match self.verbosity.log_level_filter() {
            LevelFilter::Off => None,
            LevelFilter::Error => Some(Level::ERROR),
            LevelFilter::Warn => Some(Level::WARN),
            LevelFilter::Info => Some(Level::INFO),
            LevelFilter::Debug => Some(Level::DEBUG),
            LevelFilter::Trace => Some(Level::TRACE),
        }
    }

    /// Filter built from the verbosity flags, refined by `--log-filter`
    /// directives when given.
    pub fn env_filter(&self) -> Option<EnvFilter> {
        let level = self.level()?;
        let filter = EnvFilter::default().add_directive(level.into());

        Some(match &self.log_filter {
            Some(directives) => directives
                .split(',')
                .filter_map(|directive| directive.trim().parse().ok())
                .fold(filter, EnvFilter::add_directive),
            None => filter,
        })
    }

    pub fn init(&self) {
        if let Some(filter) = self.env_filter() {
            let subscriber =
                tracing_subscriber::fmt().with_env_filter(filter);

            match self.log_format {
                LogFormat::Text => subscriber.init(),
                LogFormat::Json => subscriber.json().flatten_event(true).init(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestConfig {
        #[clap(flatten)]
        log: LogConfig,
    }

    #[test]
    fn verbosity_flags_map_to_levels() {
        let config = TestConfig::parse_from(["test"]);
        assert_eq!(config.log.level(), Some(Level::INFO));
        assert_eq!(config.log.log_format, LogFormat::Text);

        let config = TestConfig::parse_from(["test", "-vv"]);
        assert_eq!(config.log.level(), Some(Level::TRACE));

        let config = TestConfig::parse_from(["test", "-qqqq"]);
        assert_eq!(config.log.level(), None);
        assert!(config.log.env_filter().is_none());
    }

    #[test]
    fn json_format_is_parsed() {
        let config =
            TestConfig::parse_from(["test", "--log-format", "json"]);
        assert_eq!(config.log.log_format, LogFormat::Json);
        assert_eq!(config.log.log_format.to_string(), "json");
    }
}
