//! Calendar synchronization engine

pub mod locks;
pub mod merge;
pub mod orchestrator;
pub mod ports;
