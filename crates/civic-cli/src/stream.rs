//! Live update subscription over Server-Sent Events.

use civic_core::claim::Claim;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, warn};

use crate::{app::AppEvent, client::ApiClient};

// ─── Decoder ──────────────────────────────────────────────────────────────────

/// Incremental SSE decoder yielding the `data` payload of each event.
///
/// Comment lines (keep-alives) and fields other than `data` are ignored;
/// multi-line data is joined with `\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
  buf:  Vec<u8>,
  data: Vec<String>,
}

impl SseDecoder {
  /// Feed a chunk of the response body and return every event it completed.
  /// A chunk may end mid-line, even mid-character.
  pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
    self.buf.extend_from_slice(chunk);
    let mut events = Vec::new();

    while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
      let raw: Vec<u8> = self.buf.drain(..=pos).collect();
      let line = String::from_utf8_lossy(&raw);
      let line = line.trim_end_matches(['\n', '\r']);

      if line.is_empty() {
        if !self.data.is_empty() {
          events.push(self.data.join("\n"));
          self.data.clear();
        }
        continue;
      }
      if line.starts_with(':') {
        continue;
      }
      let (field, value) = line.split_once(':').unwrap_or((line, ""));
      if field == "data" {
        self.data.push(value.strip_prefix(' ').unwrap_or(value).to_owned());
      }
    }
    events
  }
}

// ─── Subscription ─────────────────────────────────────────────────────────────

/// Handle to the background task reading `/api/facts/stream`.
///
/// Dropping the handle closes the subscription.
pub struct Subscription {
  task: JoinHandle<()>,
}

impl Subscription {
  /// Open the stream and forward each decoded claim as [`AppEvent::Pushed`].
  ///
  /// Undecodable events are logged and skipped. When the connection fails or
  /// ends, [`AppEvent::StreamClosed`] is sent once; there is no reconnect.
  pub fn open(client: ApiClient, tx: UnboundedSender<AppEvent>) -> Self {
    let task = tokio::spawn(async move {
      let reason = match read_stream(&client, &tx).await {
        Ok(()) => "live updates ended".to_owned(),
        Err(e) => {
          warn!(error = %e, "live update stream failed");
          format!("live updates unavailable: {e}")
        }
      };
      let _ = tx.send(AppEvent::StreamClosed(reason));
    });
    Self { task }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    debug!("closing live update subscription");
    self.task.abort();
  }
}

async fn read_stream(client: &ApiClient, tx: &UnboundedSender<AppEvent>) -> anyhow::Result<()> {
  let mut resp = client.open_stream().await?;
  let mut decoder = SseDecoder::default();
  debug!("live update stream connected");

  while let Some(chunk) = resp.chunk().await? {
    for data in decoder.push(&chunk) {
      match serde_json::from_str::<Claim>(&data) {
        Ok(claim) => {
          if tx.send(AppEvent::Pushed(claim)).is_err() {
            return Ok(());
          }
        }
        Err(e) => warn!(error = %e, "ignoring undecodable live update"),
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, time::Duration};

  use axum::{
    Router,
    response::sse::{Event, Sse},
    routing::get,
  };
  use civic_core::seed::seed_claims;
  use tokio::sync::mpsc;

  use super::*;

  #[test]
  fn events_split_across_chunks() {
    let mut d = SseDecoder::default();
    assert!(d.push(b"data: {\"a\":").is_empty());
    assert!(d.push(b"1}\n").is_empty());
    assert_eq!(d.push(b"\n"), vec!["{\"a\":1}"]);

    // "é" split between chunks.
    let bytes = "data: caf\u{e9}\n\n".as_bytes();
    assert!(d.push(&bytes[..10]).is_empty());
    assert_eq!(d.push(&bytes[10..]), vec!["caf\u{e9}"]);
  }

  #[test]
  fn comments_and_other_fields_are_ignored() {
    let mut d = SseDecoder::default();
    let events = d.push(b":keep-alive\n\nevent: claim\nid: 4\ndata:x\r\n\r\ndata: y\ndata: z\n\n");
    assert_eq!(events, vec!["x", "y\nz"]);
  }

  #[tokio::test]
  async fn claims_are_forwarded_and_bad_events_skipped() {
    let claim = seed_claims().remove(0);
    let payload = serde_json::to_string(&claim).unwrap();
    let router = Router::new().route(
      "/api/facts/stream",
      get(move || {
        let payload = payload.clone();
        async move {
          let events = vec![
            Ok::<_, Infallible>(Event::default().data("not json")),
            Ok(Event::default().data(payload)),
          ];
          Sse::new(futures::stream::iter(events))
        }
      }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let client = ApiClient::new(format!("http://{addr}")).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = Subscription::open(client, tx);

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
      .await
      .unwrap()
      .unwrap();
    match first {
      AppEvent::Pushed(c) => assert_eq!(c, claim),
      other => panic!("unexpected event: {other:?}"),
    }
    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
      .await
      .unwrap()
      .unwrap();
    assert!(matches!(second, AppEvent::StreamClosed(_)));
  }

  #[tokio::test]
  async fn dropping_the_handle_releases_the_channel() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    drop(Subscription::open(client, tx));

    // The aborted task drops its sender, so the channel drains and closes.
    let closed = tokio::time::timeout(Duration::from_secs(5), async {
      while rx.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok());
  }
}
