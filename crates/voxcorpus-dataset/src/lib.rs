pub mod builder;
pub mod normalize;
pub mod split;
pub mod validate;

pub use builder::{DatasetBuilder, DatasetSplits};
pub use normalize::{LabelNormalizer, TextNormalizer};
pub use split::{partition, shuffle};
pub use validate::{check_validity, ExclusionCounts, Invalid};
