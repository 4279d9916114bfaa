//! Local storage layer.

pub mod profile;

pub use profile::ProfileStore;
