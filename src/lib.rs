//! rbtrace: red-black tree engine with an ordered mutation event trace.
//!
//! Layers:
//! - `domain`: keys, nodes, the arena-backed tree, events and validation (no I/O)
//! - `application`: file codecs and the tree service
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: clap front-end

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
