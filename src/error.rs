use std::io;

use thiserror::Error;

/// Exit status used for every fatal error.
pub const EXIT_FAILURE: i32 = 1;

/// Problems found while turning the command line into a `RunConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The maximum allowed value is {max}! ({option} {value})")]
    AboveMaximum {
        option: &'static str,
        value: i64,
        max: u16,
    },

    #[error("The minimum allowed value is {min}! ({option} {value})")]
    BelowMinimum {
        option: &'static str,
        value: i64,
        min: u16,
    },

    /// Unknown option, missing value or a value that is not a number.
    #[error(transparent)]
    Parse(#[from] clap::Error),
}

impl ConfigError {
    pub fn exit_code(&self) -> i32 {
        match self {
            // `--version` comes back from clap as an error printed to stdout.
            ConfigError::Parse(err) if !err.use_stderr() => 0,
            _ => EXIT_FAILURE,
        }
    }
}

/// Failures that end the whole enumeration.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Printed as `<description> (<code>)`, the way the OS reports it.
    #[error("{description} ({code})")]
    Connect {
        addr: String,
        description: String,
        code: i32,
    },

    #[error("could not write to standard output: {0}")]
    Output(#[source] io::Error),
}

impl ExchangeError {
    /// Builds a connect error from the OS error. Errors without an OS code report 0.
    pub fn connect(addr: impl Into<String>, err: &io::Error) -> Self {
        let code = err.raw_os_error().unwrap_or(0);
        // io::Error's Display appends "(os error N)"; keep only the text.
        let description = err
            .to_string()
            .trim_end_matches(&format!(" (os error {code})"))
            .to_string();

        ExchangeError::Connect {
            addr: addr.into(),
            description,
            code,
        }
    }

    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}
