//! Database layer for Logline

mod connection;
mod migrations;

pub use connection::Database;
