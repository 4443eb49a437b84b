//! Async client for the REST API of a home-automation hub.
//!
//! This crate owns the wire surface of the workspace: the raw JSON
//! shapes the hub speaks ([`EntityState`], [`ServiceRequest`]), the
//! HTTP plumbing ([`HubClient`]), and the error taxonomy ([`Error`]).
//!
//! Domain typing — classifying raw states into lights, switches, and
//! sensors — happens one layer up, in `hearth-core`. This crate stays
//! deliberately thin: no retries, no caching, no state.

pub mod client;
pub mod error;
pub mod models;

pub use client::HubClient;
pub use error::Error;
pub use models::{EntityState, ServiceAction, ServiceRequest};
