use std::io::{self, Write};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tracing::{debug, warn};

use crate::cli::RunConfig;
use crate::error::ExchangeError;

/* -------------------------
   Constants
   ------------------------- */
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const READ_CHUNK_SIZE: usize = 128;
pub const DRY_RUN_NOTICE: &str = "Dry run active, not sending message!";

/// How a single request went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Dry run, nothing was sent.
    Skipped,
    /// The peer closed the connection after sending `received` bytes.
    Completed { received: usize },
}

/// Sends `message` on a fresh connection and copies the reply to `out` until
/// the peer closes the connection.
///
/// Only a failed connect is an error. There is no read timeout: a peer that
/// never closes keeps this waiting forever.
pub async fn exchange<W: Write>(
    config: &RunConfig,
    message: &str,
    out: &mut W,
) -> Result<ExchangeOutcome, ExchangeError> {
    if config.dry_run {
        writeln!(out, "{DRY_RUN_NOTICE}").map_err(ExchangeError::Output)?;
        return Ok(ExchangeOutcome::Skipped);
    }

    let addr = config.address();
    let mut stream = connect(config, &addr).await?;
    debug!(%addr, request = message, "connected");

    if let Err(err) = stream.write_all(format!("{message}\n").as_bytes()).await {
        warn!(%addr, error = %err, "sending request failed");
        return Ok(ExchangeOutcome::Completed { received: 0 });
    }

    let mut buf = [0u8; READ_CHUNK_SIZE];
    let mut received = 0;
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                received += n;
                out.write_all(&buf[..n])
                    .and_then(|()| out.flush())
                    .map_err(ExchangeError::Output)?;
            }
            Err(err) => {
                warn!(%addr, error = %err, "reading response failed");
                break;
            }
        }
    }

    debug!(%addr, received, "connection closed by peer");
    Ok(ExchangeOutcome::Completed { received })
}

async fn connect(config: &RunConfig, addr: &str) -> Result<TcpStream, ExchangeError> {
    let result = timeout(
        CONNECT_TIMEOUT,
        TcpStream::connect((config.host.as_str(), config.port)),
    )
    .await;

    match result {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(err)) => Err(ExchangeError::connect(addr, &err)),
        Err(_) => {
            let err = io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connection timed out after {}s", CONNECT_TIMEOUT.as_secs()),
            );
            Err(ExchangeError::connect(addr, &err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, RunConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = RunConfig {
            port: listener.local_addr().unwrap().port(),
            ..RunConfig::default()
        };
        (listener, config)
    }

    /// Accepts one connection, returns the request line and answers with `reply`.
    async fn respond_once(listener: TcpListener, reply: Vec<u8>) -> String {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut request = String::new();
        reader.read_line(&mut request).await.unwrap();
        reader.get_mut().write_all(&reply).await.unwrap();
        request
    }

    #[tokio::test]
    async fn dry_run_prints_notice_without_connecting() {
        let (listener, config) = listener().await;
        let config = RunConfig { dry_run: true, ..config };
        let mut out = Vec::new();

        let outcome = exchange(&config, "opreq 0x1015 0x0", &mut out).await.unwrap();

        assert_eq!(outcome, ExchangeOutcome::Skipped);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{DRY_RUN_NOTICE}\n"));
        let accepted = timeout(Duration::from_millis(100), listener.accept()).await;
        assert!(accepted.is_err(), "dry run must not open a connection");
    }

    #[tokio::test]
    async fn request_is_newline_terminated_and_reply_echoed() {
        let (listener, config) = listener().await;
        // Spans several read chunks.
        let reply: Vec<u8> = (0..3 * READ_CHUNK_SIZE + 17).map(|i| b'a' + (i % 26) as u8).collect();
        let server = tokio::spawn(respond_once(listener, reply.clone()));
        let mut out = Vec::new();

        let outcome = exchange(&config, "opreq 0x1015 0x5003", &mut out).await.unwrap();

        assert_eq!(server.await.unwrap(), "opreq 0x1015 0x5003\n");
        assert_eq!(outcome, ExchangeOutcome::Completed { received: reply.len() });
        assert_eq!(out, reply);
    }

    #[tokio::test]
    async fn reply_bytes_are_copied_verbatim() {
        let (listener, config) = listener().await;
        let reply = vec![0x00, 0xff, b'\r', b'\n', 0x80];
        let server = tokio::spawn(respond_once(listener, reply.clone()));
        let mut out = Vec::new();

        exchange(&config, "opreq 0x1015 0x1", &mut out).await.unwrap();

        server.await.unwrap();
        assert_eq!(out, reply);
    }

    #[tokio::test]
    async fn immediate_close_is_an_empty_reply() {
        let (listener, config) = listener().await;
        let server = tokio::spawn(respond_once(listener, Vec::new()));
        let mut out = Vec::new();

        let outcome = exchange(&config, "opreq 0x1015 0x2", &mut out).await.unwrap();

        server.await.unwrap();
        assert_eq!(outcome, ExchangeOutcome::Completed { received: 0 });
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn refused_connection_is_fatal() {
        let (listener, config) = listener().await;
        drop(listener);
        let mut out = Vec::new();

        let err = exchange(&config, "opreq 0x1015 0x0", &mut out).await.unwrap_err();

        match &err {
            ExchangeError::Connect { addr, .. } => assert_eq!(addr, &config.address()),
            other => panic!("expected connect error, got {other:?}"),
        }
        assert_eq!(err.exit_code(), 1);
        assert!(out.is_empty());
    }
}
