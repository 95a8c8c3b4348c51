pub mod admin_key;
pub mod ghost;

pub use admin_key::AdminKey;
pub use ghost::{ApiRequest, FilePart, GhostClient};
