//! Storage infrastructure: the configuration file.
//!
//! The `config` sub-module reads the client's TOML configuration, fills in
//! defaults for anything the file leaves out, and checks the values before
//! the session starts.

pub mod config;
