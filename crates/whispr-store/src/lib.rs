//! Anonymous campus content store: confessions, crushes, marketplace listings
//! and comments, plus the per-device profile ledger that tracks karma.
//!
//! [`Whispr`] is the entry point. It owns the collections behind a single lock,
//! grants karma, publishes change events and coalesces persistence.

pub mod clock;
pub mod content;
pub mod cooldown;
pub mod error;
pub mod ledger;
pub mod limits;
pub mod notifier;
pub mod persist;
pub mod random;
pub mod ranking;
pub mod sanitize;
pub mod seed;
pub mod service;

pub use error::StoreError;
pub use service::{Whispr, WhisprBuilder};
