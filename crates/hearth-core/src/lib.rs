//! Entity synchronization engine for a home-automation hub.
//!
//! This crate owns the domain model and the reactive core of the
//! workspace:
//!
//! - **[`Entity`]** — closed variant over the entity kinds the consumer
//!   surface renders (lights, switches, sensors), produced by the pure
//!   [`classify`](entity::classify) function.
//!
//! - **[`EntityRepository`]** — stateless wire-to-domain adapter over
//!   the `hearth-api` hub client.
//!
//! - **[`SyncEngine`]** — the state machine. Runs the periodic refresh
//!   loop, serializes command dispatch with post-command reconciliation,
//!   and publishes [`SyncState`] snapshots through a `watch` channel.
//!   Consumers subscribe and render; nothing here ever panics past its
//!   boundary — every failure becomes observable state.

pub mod engine;
pub mod entity;
pub mod error;
pub mod repository;

pub use engine::{EngineConfig, SyncEngine, SyncState};
pub use entity::{Entity, classify};
pub use error::CoreError;
pub use repository::EntityRepository;

// Re-export the wire-level action type; callers address entities by id
// and pick an action without touching the API crate directly.
pub use hearth_api::ServiceAction;
