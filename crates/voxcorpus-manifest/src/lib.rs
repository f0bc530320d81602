pub mod error;
pub mod reader;
pub mod types;
pub mod writer;

pub use error::ManifestError;
pub use reader::read_manifest;
pub use types::{ManifestRow, SampleRecord};
pub use writer::{write_partition, write_splits, MANIFEST_HEADER};
