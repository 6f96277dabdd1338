//! Persisted session state

mod cell;

pub use cell::PersistedCell;
