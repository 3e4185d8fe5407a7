//! Data shapes flowing through the process pipeline.

mod aggregate;
mod sample;

pub use aggregate::{AggregateSnapshot, Aggregator};
pub use sample::{IoCounters, NetCounters, ProcessSample};
