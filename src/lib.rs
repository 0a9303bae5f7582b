pub mod api;
pub mod chain;
pub mod config;
pub mod db;
pub mod events;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod store;
pub mod worker;

#[macro_use]
extern crate diesel;
