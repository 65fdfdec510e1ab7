pub mod creds;
pub mod error;
pub mod inspector;
pub mod snapshot;

mod sigv4;

pub use creds::{
    default_provider, CliCredentialsProvider, Credentials, CredentialsProvider,
    EnvCredentialsProvider, StaticCredentialsProvider,
};
pub use error::InspectorError;
pub use inspector::AwsInspector;
pub use snapshot::{KeySchemaElement, SseDescription, TableSnapshot, Tag, TtlDescription};
