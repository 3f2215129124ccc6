//! # seedbed-adapters
//!
//! Transport backends for Seedbed.
//!
//! The engine only talks to a [`seedbed_proto::RequestExecutor`]; this crate
//! provides the production HTTP implementation. Test doubles live in
//! `seedbed_core::testing`.

mod http;

pub use http::{ApiConfig, HttpExecutor};
