//! Unit Tests Module

pub mod detection;
pub mod rpc;
