//! Domain layer: coordinates and marker bookkeeping.
//!
//! Nothing in here performs I/O.  The client application owns instances of
//! these types and decides when to mutate them; the types themselves only
//! enforce their own invariants.

pub mod geo;
pub mod markers;
