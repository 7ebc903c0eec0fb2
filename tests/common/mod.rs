//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod reporters;

use reduction_pipeline::pipeline::{Pipeline, Topology};

/// Build a pipeline, panicking on invalid parameters
pub fn pipeline(process_count: usize, sequence_len: usize) -> Pipeline {
    Pipeline::new(Topology::new(process_count).unwrap(), sequence_len).unwrap()
}
