//! Line decoding for `text/event-stream` provider responses.

use std::fmt::Display;

use async_stream::stream;
use futures::stream::{Stream, StreamExt};
use tracing::warn;

/// Longest line accepted before the stream is abandoned.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Data(String),
    Done,
    Skip,
}

fn decode_line(raw: &[u8]) -> Line {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim();
    if line.is_empty() || line.starts_with(':') {
        return Line::Skip;
    }
    match line.strip_prefix("data:") {
        Some(payload) => {
            let payload = payload.trim_start();
            if payload == "[DONE]" {
                Line::Done
            } else {
                Line::Data(payload.to_string())
            }
        }
        // event:, id:, retry: carry nothing we use
        None => Line::Skip,
    }
}

/// Turn a chunked byte body into the payloads of its `data:` lines.
///
/// Chunks may split lines anywhere. The sequence ends at `data: [DONE]`, at
/// the end of the body, at the first transport error, or when a line grows
/// past [`MAX_LINE_BYTES`] without a newline. Errors are logged, not raised.
pub fn data_frames<S, B, E>(body: S) -> impl Stream<Item = String> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    stream! {
        let mut body = Box::pin(body);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Stream interrupted: {}", e);
                    break;
                }
            };
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                match decode_line(&line) {
                    Line::Data(payload) => yield payload,
                    Line::Done => return,
                    Line::Skip => {}
                }
            }

            if buffer.len() > MAX_LINE_BYTES {
                warn!("Stream line exceeded {} bytes without a newline", MAX_LINE_BYTES);
                return;
            }
        }

        if let Line::Data(payload) = decode_line(&buffer) {
            yield payload;
        }
    }
}
