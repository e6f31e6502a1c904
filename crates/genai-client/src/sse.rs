//! Relay of provider server-sent events as text fragments

use crate::error::{check_status, GenAiError, Result};
use crate::TextStream;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use std::fmt;

/// What one provider event means for the fragment stream
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Chunk {
    Text(String),
    /// Keep-alives, role headers, usage-only events
    Skip,
    /// Explicit end marker sent by the provider
    Done,
}

pub(crate) type ParseFn = fn(&str) -> Result<Chunk>;

/// Send `request` on first poll and relay its event stream through `parse`
pub(crate) fn request_stream(request: reqwest::RequestBuilder, parse: ParseFn) -> TextStream {
    Box::pin(async_stream::stream! {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                yield Err(GenAiError::from(e));
                return;
            }
        };
        let response = match check_status(response).await {
            Ok(response) => response,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let mut fragments = decode(response.bytes_stream(), parse);
        while let Some(item) = fragments.next().await {
            yield item;
        }
    })
}

/// Decode a raw SSE byte stream into text fragments.
///
/// Empty fragments are dropped. The stream ends after the provider's end
/// marker, at end of input, or right after the first error.
pub(crate) fn decode<S, B, E>(bytes: S, parse: ParseFn) -> TextStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut events = Box::pin(
            bytes
                .map(|chunk| chunk.map_err(|e| std::io::Error::other(e.to_string())))
                .eventsource(),
        );

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => match parse(&event.data) {
                    Ok(Chunk::Text(text)) if !text.is_empty() => {
                        yield Ok(text);
                    }
                    Ok(Chunk::Text(_)) | Ok(Chunk::Skip) => {}
                    Ok(Chunk::Done) => return,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                },
                Err(e) => {
                    yield Err(GenAiError::Stream(e.to_string()));
                    return;
                }
            }
        }
    })
}
