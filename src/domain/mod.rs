//! Domain logic - pure release rules independent of the package index

pub mod release;
pub mod retention;

pub use release::{classify, ReleaseDescriptor, ReleaseKind, ReleaseLine};
pub use retention::{ensure_deletable, plan, DeletionPlan};
