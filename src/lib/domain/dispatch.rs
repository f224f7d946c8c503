//! The bulk send dispatch pipeline
//!
//! A [`request::SendRequest`] flows through validation, content
//! normalization, header construction and batched rate-limited delivery to
//! the upstream provider, ending in a [`result::SendResult`].

pub mod batcher;
pub mod config;
pub mod content;
pub mod errors;
pub mod headers;
pub mod provider;
pub mod request;
pub mod result;
pub mod service;
pub mod validator;
pub mod value_objects;
