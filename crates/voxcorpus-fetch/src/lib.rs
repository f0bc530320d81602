pub mod error;
pub mod fetcher;
pub mod remote;

pub use error::FetchError;
pub use fetcher::{FetchFailure, FetchReport, Fetcher};
pub use remote::{HttpSource, RemoteSource};
