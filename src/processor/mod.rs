pub mod aggregations;
pub mod anomaly;
pub mod date_filter;
pub mod periods;
pub mod summary;

pub use aggregations::*;
pub use anomaly::*;
pub use date_filter::*;
pub use periods::*;
pub use summary::*;
