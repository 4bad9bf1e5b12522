use crate::error::{AppError, AppResult};
use std::io::{self, BufRead, Write};

/// Read a streaming response line-by-line, echoing chunks as they arrive.
///
/// A read failure is the connection dropping, and is reported against `service`.
pub fn read_stream_to_string<R, W, F>(
    service: &'static str,
    reader: R,
    echo: &mut W,
    mut parse_line: F,
) -> AppResult<String>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> AppResult<Option<String>>,
{
    let mut out = String::new();

    for line in reader.lines() {
        let line = line.map_err(|source| AppError::StreamInterrupted { service, source })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(chunk) = parse_line(line)? {
            out.push_str(&chunk);
            write!(echo, "{}", chunk)?;
            echo.flush()?;
        }
    }

    Ok(out)
}

/// Convenience wrapper that echoes to stdout.
pub fn read_stream_to_stdout<R, F>(
    service: &'static str,
    reader: R,
    parse_line: F,
) -> AppResult<String>
where
    R: BufRead,
    F: FnMut(&str) -> AppResult<Option<String>>,
{
    let mut stdout = io::stdout();
    let text = read_stream_to_string(service, reader, &mut stdout, parse_line)?;
    writeln!(stdout)?;
    Ok(text)
}
