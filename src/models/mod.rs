pub mod data_models;
pub mod report_models;

pub use data_models::*;
pub use report_models::*;
