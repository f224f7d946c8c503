//! Domain layer

pub mod dispatch;
