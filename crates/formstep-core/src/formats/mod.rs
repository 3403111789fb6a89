//! # Formats Module
//!
//! On-disk snapshot format for the file backend.

mod persistence;

pub use persistence::{MAX_SNAPSHOT_SIZE, SnapshotHeader, store_from_bytes, store_to_bytes};
