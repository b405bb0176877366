use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::Layer;

mod metric;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Verbosity {
    Debug,
    #[default]
    Info,
}

impl FromStr for Verbosity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Verbosity::Debug),
            "info" => Ok(Verbosity::Info),
            _ => Ok(Verbosity::Debug),
        }
    }
}

impl From<String> for Verbosity {
    fn from(value: String) -> Self {
        Self::from_str(&value).unwrap_or(Verbosity::Debug)
    }
}

/// Human readable log output. Metrics emitted by [`metric!`](crate::metric) are debug events,
/// so they only show up with [`Verbosity::Debug`].
pub struct Fmt;

impl Fmt {
    pub fn layer<S>(verbosity: &Verbosity) -> impl Layer<S>
    where
        S: for<'span> tracing_subscriber::registry::LookupSpan<'span> + tracing::Subscriber,
    {
        let filter = match verbosity {
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
        };

        tracing_subscriber::fmt::layer().with_ansi(false).compact().with_filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    use crate::service::monitoring::{Fmt, Verbosity};
    use crate::{measure_duration, metric};

    #[test]
    fn unknown_verbosity_defaults_to_debug() {
        assert_eq!(Verbosity::from_str("info"), Ok(Verbosity::Info));
        assert_eq!(Verbosity::from_str("trace"), Ok(Verbosity::Debug));
        assert_eq!(serde_json::from_str::<Verbosity>("\"debug\"").unwrap(), Verbosity::Debug);
    }

    #[test]
    fn configured_verbosity_falls_back_to_debug() {
        assert_eq!(serde_json::from_str::<Verbosity>("\"info\"").unwrap(), Verbosity::Info);
        assert_eq!(serde_json::from_str::<Verbosity>("\"trace\"").unwrap(), Verbosity::Debug);
        assert_eq!(serde_json::to_string(&Verbosity::Info).unwrap(), "\"info\"");
    }

    #[test]
    fn metrics_are_emitted_through_the_fmt_layer() {
        let subscriber = Registry::default().with(Fmt::layer(&Verbosity::Debug));

        tracing::subscriber::with_default(subscriber, || {
            let (result, duration) = measure_duration!(Err::<(), _>("boom"));
            metric!(counter [ test_call ] = 1, method = "test");
            metric!(histogram [ test_call_duration_milliseconds ] = duration.as_millis(), method = "test");
            metric!(on error result => counter [ test_call_error ] = 1, method = "test");

            assert!(result.is_err());
        });
    }
}
