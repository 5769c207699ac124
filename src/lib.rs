//! Home Monitor - smart home energy and environment API over CSV sensor exports
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
