//! # property_enumerator
//!
//! Asks a camera, through the command socket of the `ptpip` shell server,
//! for the description of every device property code in a range and prints
//! each raw reply. Useful to find out which property codes a device supports.
//!
//! ## Example Usage
//!
//! ```bash
//! property_enumerator -h 127.0.0.1 -p 15740 -s 20480 -e 20736
//! property_enumerator --dry-run -s 0 -e 16
//! ```

mod cli;
mod enumerate;
mod error;
mod exchange;
mod logging;
mod request;

use std::io;
use std::process;

use cli::{Invocation, RunConfig};
use error::{ConfigError, EXIT_FAILURE, ExchangeError};

/// Runs the whole range against stdout.
async fn run(config: &RunConfig) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    enumerate::enumerate(config, &mut out).await?;
    Ok(())
}

/// Entry point. Everything happens in sequence, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init_logging();

    let config = match cli::parse_args(std::env::args_os()) {
        Ok(Invocation::Help) => {
            print!("{}", cli::usage());
            return;
        }
        Ok(Invocation::Run(config)) => config,
        Err(err) => {
            let code = err.exit_code();
            match err {
                // clap picks stdout or stderr and formats usage hints itself
                ConfigError::Parse(err) => {
                    let _ = err.print();
                }
                err => eprintln!("{err}"),
            }
            process::exit(code);
        }
    };

    tracing::debug!(?config, "starting enumeration");

    if let Err(err) = run(&config).await {
        eprintln!("{err}");
        let code = err
            .downcast_ref::<ExchangeError>()
            .map_or(EXIT_FAILURE, ExchangeError::exit_code);
        process::exit(code);
    }
}
