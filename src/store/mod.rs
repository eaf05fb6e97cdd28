//! Persistent record of the last reported homework statuses.
//!
//! Sub-modules:
//! - `schema`: SQLite DDL definitions.
//! - `sqlite`: SQLite-backed [`StateStore`].

pub(crate) mod schema;
pub mod sqlite;

pub use sqlite::StateStore;
