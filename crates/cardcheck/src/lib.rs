//! Browser layer of the cardcheck harness.
//!
//! Owns the headless Chrome lifecycle and everything that runs against a
//! live page: navigation and settling, the flip-card interaction driver,
//! page health assertions, the screenshot capture pipeline, and the
//! sequential case runner that composes them per generated case.

pub mod browser;
pub mod capture;
pub mod expectations;
pub mod flip;
pub mod health;
pub mod page;
pub mod runner;
