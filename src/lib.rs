pub mod config;
pub mod error;
pub mod relay;
pub mod server;
pub mod stream;
pub mod upstream;

pub use error::{Error, Result};
