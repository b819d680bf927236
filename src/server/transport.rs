//! Guarded newline-delimited stdio transport for the MCP service.
//!
//! Input is framed before it reaches rmcp. Lines that are oversized, not UTF-8, not
//! JSON, or not a JSON-RPC 2.0 object are answered here with a JSON-RPC error and
//! never forwarded, so a bad message cannot end the session. Only end of input does.

use bytes::BytesMut;
use futures::StreamExt;
use rmcp::model::{ErrorCode, ErrorData};
use rmcp::transport::io::stdio;
use rmcp::ServiceExt;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use super::BrandServer;
use crate::error::{MirageError, Result};

/// Longest accepted message, excluding the newline.
pub const MAX_MESSAGE_BYTES: usize = 8 * 1024 * 1024;

const PIPE_CAPACITY: usize = 64 * 1024;
const READ_CHUNK: usize = 8 * 1024;

/// Serve MCP over the process's stdin and stdout until stdin closes.
pub async fn serve_stdio(server: BrandServer) -> Result<()> {
    let (stdin, stdout) = stdio();
    serve(server, stdin, stdout).await
}

/// Serve MCP over `reader`/`writer` until `reader` reaches EOF.
pub async fn serve<R, W>(server: BrandServer, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (to_service, service_in) = tokio::io::duplex(PIPE_CAPACITY);
    let (service_out, from_service) = tokio::io::duplex(PIPE_CAPACITY);
    let (rejects_tx, rejects_rx) = mpsc::channel(16);

    let inbound = tokio::spawn(forward_input(reader, to_service, rejects_tx));
    let outbound = tokio::spawn(merge_output(from_service, rejects_rx, writer));

    let outcome = match server.serve((service_in, service_out)).await {
        Ok(service) => {
            info!("MCP session started");
            match service.waiting().await {
                Ok(reason) => {
                    info!(?reason, "MCP session ended");
                    Ok(())
                }
                Err(err) => Err(MirageError::Io(io::Error::other(err))),
            }
        }
        Err(err) => {
            info!(error = %err, "session ended before initialization");
            Ok(())
        }
    };

    inbound.abort();
    let inbound = inbound.await;
    let outbound = outbound
        .await
        .map_err(|err| MirageError::Io(io::Error::other(err)))?;

    outcome?;
    if let Ok(Err(err)) = inbound {
        return Err(err.into());
    }
    outbound.map_err(MirageError::from)
}

/// Frame `reader` into lines, forwarding JSON-RPC messages and rejecting the rest.
async fn forward_input<R>(
    mut reader: R,
    mut service: DuplexStream,
    rejects: mpsc::Sender<String>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut codec = LinesCodec::new_with_max_length(MAX_MESSAGE_BYTES);
    let mut buf = BytesMut::with_capacity(READ_CHUNK);

    loop {
        buf.reserve(READ_CHUNK);
        let eof = reader.read_buf(&mut buf).await? == 0;

        loop {
            let decoded = if eof {
                codec.decode_eof(&mut buf)
            } else {
                codec.decode(&mut buf)
            };
            let verdict = match decoded {
                Ok(Some(line)) => screen(&line).map(|kept| kept.map(str::to_owned)),
                Ok(None) => break,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(limit = MAX_MESSAGE_BYTES, "rejecting oversized message");
                    Err(rejection(
                        Value::Null,
                        ErrorCode::PARSE_ERROR,
                        format!("message exceeds {MAX_MESSAGE_BYTES} bytes"),
                    ))
                }
                Err(LinesCodecError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %err, "rejecting message that is not UTF-8");
                    Err(rejection(
                        Value::Null,
                        ErrorCode::PARSE_ERROR,
                        "message is not valid UTF-8",
                    ))
                }
                Err(LinesCodecError::Io(err)) => return Err(err),
            };

            match verdict {
                Ok(Some(message)) => match forward(&mut service, &message).await {
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                        debug!("service stopped reading input");
                        return Ok(());
                    }
                    other => other?,
                },
                Ok(None) => {}
                Err(reply) => {
                    if rejects.send(reply).await.is_err() {
                        return Ok(());
                    }
                }
            }
        }

        if eof {
            debug!("input closed");
            return Ok(());
        }
    }
}

async fn forward(service: &mut DuplexStream, message: &str) -> io::Result<()> {
    service.write_all(message.as_bytes()).await?;
    service.write_all(b"\n").await
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
}

/// Decide what to do with one input line: forward it, skip it, or answer it here.
fn screen(line: &str) -> std::result::Result<Option<&str>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line).map_err(|err| {
        warn!(error = %err, "rejecting message that is not JSON");
        rejection(Value::Null, ErrorCode::PARSE_ERROR, format!("parse error: {err}"))
    })?;

    let envelope = match Envelope::deserialize(&value) {
        Ok(envelope) if value.is_object() => envelope,
        _ => {
            warn!("rejecting message that is not a JSON-RPC object");
            return Err(rejection(
                Value::Null,
                ErrorCode::INVALID_REQUEST,
                "expected a single JSON-RPC 2.0 object",
            ));
        }
    };

    if envelope.jsonrpc.as_deref() != Some("2.0") {
        warn!(version = ?envelope.jsonrpc, "rejecting message with wrong jsonrpc version");
        return Err(rejection(
            envelope.id.unwrap_or(Value::Null),
            ErrorCode::INVALID_REQUEST,
            "jsonrpc must be \"2.0\"",
        ));
    }

    Ok(Some(line))
}

fn rejection(id: Value, code: ErrorCode, message: impl Into<String>) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": ErrorData::new(code, message.into(), None),
    })
    .to_string()
}

/// Write the service's replies and local rejections to `writer`, one whole line at a time.
async fn merge_output<W>(
    service: DuplexStream,
    mut rejects: mpsc::Receiver<String>,
    mut writer: W,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut replies = FramedRead::new(service, LinesCodec::new());
    let mut service_open = true;
    let mut rejects_open = true;

    while service_open || rejects_open {
        let line = tokio::select! {
            reply = replies.next(), if service_open => match reply {
                Some(Ok(line)) => line,
                Some(Err(err)) => return Err(codec_error(err)),
                None => {
                    service_open = false;
                    continue;
                }
            },
            reject = rejects.recv(), if rejects_open => match reject {
                Some(line) => line,
                None => {
                    rejects_open = false;
                    continue;
                }
            },
        };
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

fn codec_error(err: LinesCodecError) -> io::Error {
    match err {
        LinesCodecError::Io(err) => err,
        LinesCodecError::MaxLineLengthExceeded => {
            io::Error::new(io::ErrorKind::InvalidData, "reply line too long")
        }
    }
}
