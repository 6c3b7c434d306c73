//! Post-processing for culvert scour flume experiments: per-condition mean
//! discharge, wetted area of the culvert barrel, outlet velocity at model
//! and prototype scale, and the scour threshold velocities.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod store;
