//! `GET /facts/stream` — Server-Sent Events of newly fact-checked claims.
//!
//! Each event is an unnamed `data:` frame holding one JSON [`Claim`]. A
//! subscriber that falls behind skips the events it missed.
//!
//! [`Claim`]: civic_core::claim::Claim

use std::{convert::Infallible, time::Duration};

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt as _};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::AppState;

pub async fn handler<S, N, T>(
  State(state): State<AppState<S, N, T>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
  debug!("live update subscriber connected");

  let stream = BroadcastStream::new(state.events.subscribe()).filter_map(|result| async move {
    match result {
      Ok(claim) => match Event::default().json_data(&claim) {
        Ok(event) => Some(Ok(event)),
        Err(e) => {
          warn!(id = %claim.id, error = %e, "failed to encode claim event");
          None
        }
      },
      Err(e) => {
        // Lagged: the subscriber missed events.
        warn!(error = %e, "live update stream error");
        None
      }
    }
  });

  Sse::new(stream).keep_alive(
    KeepAlive::new()
      .interval(Duration::from_secs(15))
      .text("keep-alive"),
  )
}
