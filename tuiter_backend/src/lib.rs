pub mod api;
pub mod bookmarks;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod error;
pub mod follows;
pub mod likes;
pub mod messages;
pub mod node;
pub mod sessions;
pub mod telemetry;
pub mod tuits;
pub mod users;
pub mod utils;
pub mod views;
