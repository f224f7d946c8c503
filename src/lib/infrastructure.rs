//! Infrastructure layer

pub mod http;
pub mod provider;
