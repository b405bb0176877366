/// Logs the error carried by a `Result` and hands the result back untouched.
/// Example
/// ```rust
/// use splits_common::log_if_error;
///
/// fn parse(value: &str) -> Result<u64, std::num::ParseIntError> {
///     log_if_error!(value.parse::<u64>())
/// }
/// ```
#[macro_export]
macro_rules! log_if_error {
    ($e: expr) => {
        match $e {
            Ok(v) => Ok(v),
            Err(e) => {
                $crate::service::tracing::error!(message=%e);
                Err(e)
            },
        }
    };
    ($e: expr, warn if $pattern: pat) => {
        match $e {
            Ok(v) => Ok(v),
            Err(e @ $pattern) => {
                $crate::service::tracing::warn!(message=%e);
                Err(e)
            },
            Err(e) => {
                $crate::service::tracing::error!(message=%e);
                Err(e)
            },
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, PartialEq)]
    enum Error {
        Expected,
        Unexpected,
    }

    impl std::fmt::Display for Error {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn fail(error: Error) -> Result<u64, Error> {
        Err(error)
    }

    #[test]
    fn result_is_returned_unchanged() {
        assert_eq!(log_if_error!(Ok::<u64, Error>(1)), Ok(1));
        assert_eq!(log_if_error!(fail(Error::Unexpected)), Err(Error::Unexpected));
        assert_eq!(log_if_error!(fail(Error::Expected), warn if Error::Expected), Err(Error::Expected));
        assert_eq!(log_if_error!(fail(Error::Unexpected), warn if Error::Expected), Err(Error::Unexpected));
    }
}
