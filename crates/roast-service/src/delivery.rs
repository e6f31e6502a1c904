//! Server-sent event framing for streamed comparisons

use crate::generator::FragmentStream;
use crate::types::Fragment;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{stream, Stream, StreamExt};
use serde_json::json;
use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// Name of the event that closes every stream
pub const END_EVENT: &str = "end";
pub const END_DATA: &str = "[DONE]";

fn fragment_event(fragment: Fragment) -> Event {
    let payload = match fragment {
        Fragment::Content(text) => json!({ "content": text }),
        Fragment::Error(message) => json!({ "error": message }),
    };
    Event::default().data(payload.to_string())
}

fn end_event() -> Event {
    Event::default().event(END_EVENT).data(END_DATA)
}

/// Text of a panic payload, for `panic!` with a literal or a format string
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unexpected error".to_string()
    }
}

/// One `data:` frame per fragment, then the end marker. The response body
/// finishes right after the end marker.
///
/// A panic while producing fragments becomes a final error frame.
pub fn event_stream(
    fragments: FragmentStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let events = AssertUnwindSafe(fragments)
        .catch_unwind()
        .map(|fragment| match fragment {
            Ok(fragment) => fragment,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(error = %message, "Fragment stream panicked");
                Fragment::Error(message)
            }
        })
        .map(fragment_event)
        .chain(stream::once(async { end_event() }))
        .map(Ok::<_, Infallible>);
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// A stream that carries only `message` as an error frame
pub fn error_only(message: String) -> FragmentStream {
    Box::pin(stream::once(async move { Fragment::Error(message) }))
}
