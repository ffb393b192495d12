//! Hierarchical aggregation of the flat store feeds into city, area, and
//! zone entities plus a deduplicated store catalog.

pub mod aggregate;
pub mod catalog;
pub mod summary;

pub use aggregate::{aggregate, Hierarchy, UNASSIGNED_ZONE, UNKNOWN_AREA, UNKNOWN_CITY};
pub use catalog::StoreCatalog;
pub use summary::{summarize, FormatCount, SelectionSummary};
