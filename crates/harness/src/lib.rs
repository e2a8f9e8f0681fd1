//! Browser-free core of the cardcheck harness.
//!
//! Everything in this crate works against the filesystem and plain data:
//! discovering SKU directories, resolving per-unit sale status, generating
//! the (unit x viewport x side) test matrix, mapping cases to artifact
//! paths, and collecting per-case outcomes into a run report. Driving the
//! actual browser lives in the `cardcheck` crate on top of this one.

pub mod config;
pub mod discovery;
pub mod matrix;
pub mod report;
pub mod status;
pub mod viewport;
