pub mod dataset;
pub mod upload;
