pub mod client;
pub mod errors;
#[cfg(test)]
pub mod mock_spotify;
pub mod models;
pub mod service;
