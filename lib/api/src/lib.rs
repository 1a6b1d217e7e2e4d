//! # shapeshift API
//!
//! REST surface over a configured [`Shapeshifter`](shapeshift_core::Shapeshifter).
//!
//! - `POST /shapeshift` - reshape `source` into the structure of `target`
//! - `GET /health` - provider and model in use

pub mod rest;

pub use rest::RestApi;
