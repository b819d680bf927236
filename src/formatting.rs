use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mirage_lib::{ErrorPayload, MirageError};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Tool ran and reported a failure.
pub const EXIT_TOOL_FAILURE: u8 = 1;
/// Startup failed: bad config, missing credentials, unreadable input.
pub const EXIT_FATAL: u8 = 2;

/// Serialize `body` in the requested format to a file or stdout.
pub fn write_output<T: Serialize>(
    body: &T,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = render(body, format)?;
    match output {
        Some(path) => std::fs::write(path, format!("{content}\n"))?,
        None => println!("{content}"),
    }
    Ok(())
}

fn render<T: Serialize>(body: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(body),
        OutputFormat::Pretty => serde_json::to_string_pretty(body),
    }
}

/// Report a failed tool call on stdout (or `output`) and return exit code 1.
pub fn render_tool_failure(
    payload: &ErrorPayload,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    if let Err(write_err) = write_output(payload, format, output.as_deref()) {
        eprintln!("Failed to write error output: {write_err}");
    }
    ExitCode::from(EXIT_TOOL_FAILURE)
}

/// Report a fatal error on stderr and return exit code 2.
pub fn render_fatal(err: &MirageError) -> ExitCode {
    let payload = err.to_payload();
    let content = serde_json::to_string(&payload)
        .unwrap_or_else(|_| format!("{{\"category\":\"internal\",\"message\":\"{err}\"}}"));
    eprintln!("{content}");
    ExitCode::from(EXIT_FATAL)
}
