//! Dataset lookup, filename matching and slide aggregation for HippoLens.
//!
//! This crate has no HTTP or async code; the API crate wires it to routes.

pub mod aggregate;
pub mod analysis;
pub mod coordinates;
pub mod dataset;
pub mod error;
pub mod matcher;
pub mod naming;
