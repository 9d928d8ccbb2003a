pub mod aggregator;
pub mod auth;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod deleter;
pub mod error;
pub mod gmail_api;
pub mod lister;
pub mod server;
pub mod state;
pub mod types;
