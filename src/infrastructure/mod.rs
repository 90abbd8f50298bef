//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The MultiBaas gateway client (reqwest)
//! - Envelope discrimination and numeric decoding of gateway responses

pub mod gateway;

pub use gateway::{Gateway, HttpGateway};
