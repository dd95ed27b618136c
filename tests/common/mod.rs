//! Common test utilities for vhd-autonotes integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod source;

#[allow(unused_imports)]
pub use fixtures::*;
pub use source::*;
