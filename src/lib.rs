pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod registry;
pub mod server;
pub mod session;
