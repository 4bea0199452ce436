pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod event;
pub mod ext;
pub mod graphql;
pub mod signing;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod testing;
