// Public API for integration tests and potential library usage

pub mod api;
pub mod app;
pub mod config;
pub mod deck;
pub mod error;
pub mod expiry;
pub mod protocol;
pub mod room;
pub mod state;
pub mod types;
pub mod ws;
