use std::io::Write;

use tracing::{debug, info};

use crate::cli::RunConfig;
use crate::error::ExchangeError;
use crate::exchange::{ExchangeOutcome, exchange};
use crate::request::{composed_line, format_request, separator_for};

/// Totals for one enumeration run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub probed: u32,
    pub skipped: u32,
    pub received: usize,
}

/// Probes every property code in `[range_start, range_end)` in ascending order.
///
/// Each exchange is framed by dash separators as wide as its
/// `Composed message` line; the first one also gets a leading separator.
/// A connect failure returns straight away, leaving the frame open.
pub async fn enumerate<W: Write>(config: &RunConfig, out: &mut W) -> Result<Summary, ExchangeError> {
    let mut summary = Summary::default();

    for code in config.range_start..config.range_end {
        let message = format_request(code);
        let line = composed_line(&message);
        let separator = separator_for(&line);

        if code == config.range_start {
            emit(out, &separator)?;
        }
        emit(out, &line)?;

        debug!(code, "probing property code");
        let outcome = match exchange(config, &message, out).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if let ExchangeError::Connect { addr, code: os_code, .. } = &err {
                    debug!(%addr, os_code, code, "connect failed, abandoning the rest of the range");
                }
                return Err(err);
            }
        };
        match outcome {
            ExchangeOutcome::Skipped => summary.skipped += 1,
            ExchangeOutcome::Completed { received } => summary.received += received,
        }
        summary.probed += 1;

        emit(out, &separator)?;
    }

    info!(
        probed = summary.probed,
        skipped = summary.skipped,
        received = summary.received,
        "enumeration finished"
    );
    Ok(summary)
}

/// Writes one line and flushes, so it shows up before the next network wait.
fn emit<W: Write>(out: &mut W, line: &str) -> Result<(), ExchangeError> {
    writeln!(out, "{line}")
        .and_then(|()| out.flush())
        .map_err(ExchangeError::Output)
}
