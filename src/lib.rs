//! Project board: Projects own Features, Features own Tasks, all served as
//! JSON over HTTP and persisted in SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
