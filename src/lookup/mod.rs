pub mod batch;
pub mod sheet;
pub mod workflow;

pub use batch::{BatchDriver, BatchReport, BatchStats, CachePaths, Pacing};
pub use sheet::{Grid, Workbook};
pub use workflow::{AddressResolver, Outcome, Resolution, RetryPolicy};
