//! Recording outbound sender for tests.
//!
//! `RecordingOutbound` stands in for the WebSocket: every frame handed to
//! [`Outbound::send_text`] is kept in `sent` so assertions can inspect what
//! would have gone over the wire, in order.
//!
//! Set `should_fail = true` to simulate a connection that has gone away.

use serde_json::Value;

use crate::application::session_client::{Outbound, SendError};

/// An outbound sender that records frames instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingOutbound {
    /// Every frame accepted, in send order.
    pub sent: Vec<String>,
    /// When `true`, every send returns [`SendError::Closed`] and records
    /// nothing.
    pub should_fail: bool,
}

impl RecordingOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every recorded frame as JSON.
    ///
    /// # Panics
    ///
    /// Panics if a recorded frame is not valid JSON; the client only ever
    /// sends JSON, so that is a test failure.
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent
            .iter()
            .map(|frame| {
                serde_json::from_str(frame)
                    .unwrap_or_else(|e| panic!("recorded frame {frame:?} is not JSON: {e}"))
            })
            .collect()
    }
}

impl Outbound for RecordingOutbound {
    fn send_text(&mut self, text: String) -> Result<(), SendError> {
        if self.should_fail {
            return Err(SendError::Closed);
        }
        self.sent.push(text);
        Ok(())
    }
}
