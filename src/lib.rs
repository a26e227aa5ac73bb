pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod locking;
pub mod models;
pub mod router;
pub mod state;
