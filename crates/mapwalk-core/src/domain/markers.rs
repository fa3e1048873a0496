//! User identities and the table of markers shown for them.
//!
//! The table is generic over the marker handle type `H` so that this crate
//! stays independent of any particular map widget.  The client instantiates
//! it with its own `MarkerHandle`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a connected user.
///
/// The server hands out decimal strings (`"1"`, `"2"`, ...) but the client
/// treats the value as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for UserId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// What the client currently knows about one user's marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSlot<H> {
    /// The user has never been seen, or has left.
    Absent,
    /// The user joined but no position has arrived yet.
    Placeholder,
    /// A marker is on the map.
    Materialized(H),
}

impl<H> MarkerSlot<H> {
    pub fn is_materialized(&self) -> bool {
        matches!(self, MarkerSlot::Materialized(_))
    }
}

/// Marker slots keyed by user.
///
/// `Absent` is never stored: an absent user simply has no entry.  Every
/// mutating method that displaces a materialized handle returns it, so the
/// caller can take the visual marker off the map and never leak one.
#[derive(Debug, Clone)]
pub struct MarkerTable<H> {
    entries: HashMap<UserId, MarkerSlot<H>>,
}

impl<H> Default for MarkerTable<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H: Copy> MarkerTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `id`, `Absent` if unknown.
    pub fn slot(&self, id: &str) -> MarkerSlot<H> {
        self.entries.get(id).copied().unwrap_or(MarkerSlot::Absent)
    }

    /// Records `id` as joined-but-unpositioned.
    ///
    /// Returns the handle that was materialized for `id`, if any.
    pub fn mark_placeholder(&mut self, id: UserId) -> Option<H> {
        match self.entries.insert(id, MarkerSlot::Placeholder) {
            Some(MarkerSlot::Materialized(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Binds `handle` to `id`.
    ///
    /// Returns the handle previously materialized for `id`, if any.
    pub fn materialize(&mut self, id: UserId, handle: H) -> Option<H> {
        match self.entries.insert(id, MarkerSlot::Materialized(handle)) {
            Some(MarkerSlot::Materialized(previous)) => Some(previous),
            _ => None,
        }
    }

    /// Deletes the entry for `id` if and only if it is materialized.
    ///
    /// Placeholders and unknown ids are left alone and yield `None`.
    pub fn remove_materialized(&mut self, id: &str) -> Option<H> {
        match self.entries.get(id) {
            Some(MarkerSlot::Materialized(handle)) => {
                let handle = *handle;
                self.entries.remove(id);
                Some(handle)
            }
            _ => None,
        }
    }

    /// Number of known users (placeholders included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of users with a marker on the map.
    pub fn materialized_count(&self) -> usize {
        self.entries
            .values()
            .filter(|slot| slot.is_materialized())
            .count()
    }

    /// Iterates over every known user and their slot, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&UserId, MarkerSlot<H>)> + '_ {
        self.entries.iter().map(|(id, slot)| (id, *slot))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
