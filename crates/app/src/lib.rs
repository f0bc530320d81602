pub mod runtime;

pub use runtime::{ImportPipeline, ImportSummary};
