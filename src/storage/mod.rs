//! Storage layer.
//!
//! Everything that touches the `SQLite` file goes through here:
//! - **Connection**: path resolution, per-call connections and error mapping
//! - **Database**: the read/write façade with its query cache
//! - **Records**: ordered rows and the [`FromRecord`] mapping trait
//! - **Schema**: versioned migrations for the application tables

// Allow cast precision loss for gauge values.
#![allow(clippy::cast_precision_loss)]
// Allow significant_drop_tightening - guards are held for a handful of statements.
#![allow(clippy::significant_drop_tightening)]

pub mod cache;
pub mod connection;
pub mod database;
pub mod migrations;
pub mod record;
pub mod schema;
pub mod value;

pub use cache::{CacheSettings, InvalidationPolicy, QueryCache};
pub use connection::{DatabasePaths, acquire_lock};
pub use database::{ColumnInfo, Database, Statement, write_target};
pub use record::{FromRecord, Record};
pub use value::SqlValue;
