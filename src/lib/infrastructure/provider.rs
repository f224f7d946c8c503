//! Provider client implementations

pub mod http;
