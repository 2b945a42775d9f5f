pub mod api;
pub mod config;
pub mod credentials;
pub mod google;
pub mod report;
pub mod server;
pub mod state;
