//! Coordinates and the local user's walkable position.
//!
//! # Why store steps instead of a running `f64`? (for beginners)
//!
//! Floating-point addition is not exactly reversible: `x + 0.00014 - 0.00014`
//! is frequently a few ULPs away from `x`.  If the local position were a
//! running `f64`, pressing W then S would not bring the marker back to the
//! exact spot it started from, and long walks would slowly accumulate error.
//!
//! [`LocalPosition`] instead remembers the random starting point (the
//! *anchor*) plus an integer number of steps taken on each axis.  The current
//! coordinate is always recomputed as `anchor + steps × step_size`, so:
//!
//! - W then S returns to `steps = 0`, i.e. exactly the anchor.
//! - The error after a thousand steps is the same as after one.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Latitude change, in degrees, of a single north/south step.
pub const LAT_STEP_DEG: f64 = 0.00014;

/// Longitude change, in degrees, of a single east/west step.
pub const LNG_STEP_DEG: f64 = 0.00020;

/// Reference point new sessions start around (Fresh Pond, Cambridge MA).
pub const DEFAULT_REFERENCE: LatLng = LatLng::new(42.388282, -71.153968);

/// Maximum offset, in degrees, of a random starting coordinate from the
/// reference point on each axis.
pub const DEFAULT_START_JITTER_DEG: f64 = 0.005;

/// A latitude/longitude pair in degrees.
///
/// No range validation is performed; walking far enough north will produce
/// latitudes above 90.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// A movement expressed in whole steps along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepDelta {
    /// Positive is north.
    pub lat: i64,
    /// Positive is east.
    pub lng: i64,
}

impl StepDelta {
    pub const fn new(lat: i64, lng: i64) -> Self {
        Self { lat, lng }
    }

    /// The delta that undoes this one.
    pub const fn inverse(self) -> Self {
        Self {
            lat: -self.lat,
            lng: -self.lng,
        }
    }
}

/// The local user's position: a fixed anchor plus the steps walked from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    anchor: LatLng,
    lat_steps: i64,
    lng_steps: i64,
}

impl LocalPosition {
    /// Creates a position sitting exactly on `anchor`.
    pub fn new(anchor: LatLng) -> Self {
        Self {
            anchor,
            lat_steps: 0,
            lng_steps: 0,
        }
    }

    /// The coordinate the position started from.
    pub fn anchor(&self) -> LatLng {
        self.anchor
    }

    /// Net steps walked as `(north, east)`.
    pub fn steps(&self) -> (i64, i64) {
        (self.lat_steps, self.lng_steps)
    }

    /// Walks by `delta` and returns the resulting coordinate.
    ///
    /// Step counters saturate instead of overflowing.
    pub fn apply(&mut self, delta: StepDelta) -> LatLng {
        self.lat_steps = self.lat_steps.saturating_add(delta.lat);
        self.lng_steps = self.lng_steps.saturating_add(delta.lng);
        self.current()
    }

    /// The current coordinate.
    pub fn current(&self) -> LatLng {
        LatLng {
            lat: self.anchor.lat + self.lat_steps as f64 * LAT_STEP_DEG,
            lng: self.anchor.lng + self.lng_steps as f64 * LNG_STEP_DEG,
        }
    }
}

/// Picks a starting coordinate uniformly within `±jitter` degrees of
/// `reference` on each axis.
///
/// A non-positive (or NaN) `jitter` returns `reference` unchanged rather than
/// asking `rand` for an empty range.
pub fn random_start<R: Rng + ?Sized>(reference: LatLng, jitter: f64, rng: &mut R) -> LatLng {
    if !(jitter > 0.0) {
        return reference;
    }
    LatLng {
        lat: reference.lat + rng.gen_range(-jitter..jitter),
        lng: reference.lng + rng.gen_range(-jitter..jitter),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
