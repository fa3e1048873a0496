//! Terminal key input.
//!
//! A terminal in its default (cooked) mode delivers input a line at a time,
//! so each line is split into key events: every non-whitespace character is
//! one [`KeyInput::Char`].  A line that is only a number is taken as a DOM
//! key code instead, which lets scripted input drive the client the same
//! way a browser would (`87` is W).

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use mapwalk_core::KeyInput;

/// Capacity of the key event channel.
const KEY_CHANNEL_CAPACITY: usize = 64;

/// Splits one line of terminal input into key events.
pub fn parse_key_line(line: &str) -> Vec<KeyInput> {
    let trimmed = line.trim();
    if let Ok(code) = trimmed.parse::<u32>() {
        return vec![KeyInput::Code(code)];
    }
    trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(KeyInput::Char)
        .collect()
}

/// Reads key events from stdin until EOF.
pub fn spawn_stdin_reader() -> mpsc::Receiver<KeyInput> {
    spawn_key_reader(tokio::io::stdin())
}

/// Reads key events from `reader` until EOF or until the receiver is
/// dropped.  The channel closes when the reader is exhausted.
pub fn spawn_key_reader<R>(reader: R) -> mpsc::Receiver<KeyInput>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(KEY_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    for key in parse_key_line(&line) {
                        if tx.send(key).await.is_err() {
                            return;
                        }
                    }
                }
                Ok(None) => {
                    debug!("key input reached EOF");
                    return;
                }
                Err(e) => {
                    warn!("failed to read key input: {e}");
                    return;
                }
            }
        }
    });

    rx
}

// ── Tests ─────────────────────────────────────────────────────────────────────
