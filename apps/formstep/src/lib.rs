//! # formstep
//!
//! Entry surfaces for the formstep wizard: the HTTP API, the CLI and the
//! configuration layer that feeds both. The wizard engine itself lives in
//! `formstep-core`.

pub mod api;
pub mod cli;
pub mod config;
