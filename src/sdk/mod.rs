//! # Delta Trade SDK Module
//!
//! Boundary to the Delta Trade SDK. Route handlers depend on the
//! [`DeltaTradeClient`] trait only.
//!
//! - `client`: the client trait, its factory and error type
//! - `http`: reqwest implementation against the Delta Trade API
//! - `manager`: per-account client cache
//! - `types`: pairs, prices, vaults, assets and transaction payloads
//! - `validation`: DCA vault parameter rules

pub mod client;
pub mod http;
pub mod manager;
pub mod types;
pub mod validation;

pub use client::{ClientFactory, DeltaTradeClient, SdkError};
pub use manager::SdkManager;
