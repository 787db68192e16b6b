use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::error::ConfigError;

/* -------------------------
   Constants
   ------------------------- */
// CLI metadata
const APP_NAME: &str = "property_enumerator";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const ABOUT: &str = "Enumerate the device property codes a camera supports through the ptpip shell socket";

// Host
const ID_HOST: &str = "host";
const SHORT_HOST: char = 'h';
pub const DEFAULT_HOST: &str = "127.0.0.1";

// Port
const ID_PORT: &str = "port";
const SHORT_PORT: char = 'p';
pub const DEFAULT_PORT: u16 = 15740;
const DEFAULT_PORT_ARG: &str = "15740";

// Range start
const ID_START: &str = "start";
const SHORT_START: char = 's';
const DEFAULT_START_ARG: &str = "0";

// Range end (exclusive)
const ID_END: &str = "end";
const SHORT_END: char = 'e';
const DEFAULT_END_ARG: &str = "65535";

// Flags
const LONG_DRY_RUN: &str = "dry-run";
const HELP_FLAGS: [&str; 2] = ["--help", "-help"];

// Allowed values for the port and both range bounds
pub const MIN_VALUE: u16 = 0;
pub const MAX_VALUE: u16 = 65535;

/// Settings for one run, fixed once parsing succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub host: String,
    pub port: u16,
    pub range_start: u16,
    /// Exclusive.
    pub range_end: u16,
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            range_start: MIN_VALUE,
            range_end: MAX_VALUE,
            dry_run: false,
        }
    }
}

impl RunConfig {
    /// `host:port`, as used in log lines and connect errors.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(RunConfig),
}

fn command() -> Command {
    Command::new(APP_NAME)
        .version(VERSION)
        .about(ABOUT)
        // `-h` selects the host, help is handled before clap sees the arguments
        .disable_help_flag(true)
        .arg(
            Arg::new(ID_HOST)
                .short(SHORT_HOST)
                .value_name("HOST")
                .default_value(DEFAULT_HOST),
        )
        .arg(numeric_arg(ID_PORT, SHORT_PORT, "PORT", DEFAULT_PORT_ARG))
        .arg(numeric_arg(ID_START, SHORT_START, "START", DEFAULT_START_ARG))
        .arg(numeric_arg(ID_END, SHORT_END, "END", DEFAULT_END_ARG))
        .arg(
            Arg::new(LONG_DRY_RUN)
                .long(LONG_DRY_RUN)
                .action(ArgAction::SetTrue),
        )
}

/// Numbers are read as signed so `-1` reaches the bounds check instead of
/// failing as an unknown flag.
fn numeric_arg(id: &'static str, short: char, value_name: &'static str, default: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .value_name(value_name)
        .default_value(default)
        .allow_negative_numbers(true)
        .value_parser(value_parser!(i64))
}

/// Parses the full argument list, program name included.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // Help wins over everything else, including invalid values.
    if args.iter().skip(1).any(|arg| HELP_FLAGS.iter().any(|flag| arg == *flag)) {
        return Ok(Invocation::Help);
    }

    let matches = command().try_get_matches_from(args)?;

    let host = matches
        .get_one::<String>(ID_HOST)
        .cloned()
        .expect("Default ensured by clap");
    let [port, range_start, range_end] = check_bounds([
        ("-p", numeric_value(&matches, ID_PORT)),
        ("-s", numeric_value(&matches, ID_START)),
        ("-e", numeric_value(&matches, ID_END)),
    ])?;

    Ok(Invocation::Run(RunConfig {
        host,
        port,
        range_start,
        range_end,
        dry_run: matches.get_flag(LONG_DRY_RUN),
    }))
}

fn numeric_value(matches: &ArgMatches, id: &str) -> i64 {
    matches
        .get_one::<i64>(id)
        .copied()
        .expect("Default ensured by clap")
}

/// Maximum violations are reported before minimum ones, each in option order.
fn check_bounds(values: [(&'static str, i64); 3]) -> Result<[u16; 3], ConfigError> {
    if let Some(&(option, value)) = values.iter().find(|(_, v)| *v > i64::from(MAX_VALUE)) {
        return Err(ConfigError::AboveMaximum {
            option,
            value,
            max: MAX_VALUE,
        });
    }

    if let Some(&(option, value)) = values.iter().find(|(_, v)| *v < i64::from(MIN_VALUE)) {
        return Err(ConfigError::BelowMinimum {
            option,
            value,
            min: MIN_VALUE,
        });
    }

    // Both bounds hold, so every value fits.
    Ok(values.map(|(_, v)| v as u16))
}

/* -------------------------
   Usage
   ------------------------- */

/// Option names with their help text, defaults filled in.
fn usage_table() -> [(String, String); 6] {
    [
        (
            format!("-{SHORT_HOST}"),
            format!("The host to connect to; defaults to {DEFAULT_HOST}."),
        ),
        (
            format!("-{SHORT_PORT}"),
            format!("The port to connect to; defaults to {DEFAULT_PORT}."),
        ),
        (
            format!("-{SHORT_START}"),
            format!("The decimal value to start enumeration from (defaults to {MIN_VALUE})."),
        ),
        (
            format!("-{SHORT_END}"),
            format!("The decimal value to enumerate to (defaults to {MAX_VALUE})."),
        ),
        (
            format!("--{LONG_DRY_RUN}"),
            "Do not actually execute the commands.".to_string(),
        ),
        (HELP_FLAGS[0].to_string(), "Print this message.".to_string()),
    ]
}

pub fn usage() -> String {
    usage_table()
        .iter()
        .map(|(option, help)| format!("{option}\n\t{help}\n"))
        .collect()
}
