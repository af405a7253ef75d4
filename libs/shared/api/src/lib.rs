pub mod client;
pub mod error;

pub use client::DirectoryClient;
pub use error::ApiError;
