//! Data models for the club backend.
//!
//! Field names follow the persisted `gdjData` document exactly so that stored
//! data written by the web client stays readable.

mod datastore;
mod game;
mod member;
mod stored;

pub use datastore::*;
pub use game::*;
pub use member::*;
pub use stored::Stored;
