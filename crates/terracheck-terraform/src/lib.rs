pub mod client;
pub mod error;

pub use client::TerraformClient;
pub use error::TerraformError;
