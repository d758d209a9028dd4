pub mod catalog;
pub mod config;
pub mod generator;
pub mod models;
pub mod normalize;
pub mod openrouter;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AppConfig;
pub use server::run_server;
