// Numeric core: pure, in-memory transformations over already-acquired samples.
// Nothing here performs I/O or knows about channels; callers publish the results.

pub mod aligner;
pub mod comparison;
pub mod leak;
pub mod rolling;
pub mod summary;

pub use aligner::{AlignedPoint, AlignmentStrategy, Overlay, difference, difference_with, overlay};
pub use comparison::{ComparisonEngine, compare, compare_with};
pub use leak::{Classification, GrowthLeakDetector};
pub use rolling::{RollingWindowBuffer, SparklineSnapshot};
pub use summary::{summarize, summarize_values};
