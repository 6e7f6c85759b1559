//! # CRUD Sync
//!
//! > **Keep a local copy of REST resources in step with the server.**
//!
//! This crate is a client-side synchronization layer. It gives callers fetch, create,
//! update and destroy operations on REST-style resources and reports every operation as a
//! sequence of state transitions that a reducer folds into a local, normalized state.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Transitions, not callbacks
//! Each operation emits a `Start` transition, talks to the API, then emits exactly one
//! `Success` or `Error` transition. The same outcome is returned to the caller as a
//! `Result`. Observers of the store and direct callers never disagree.
//!
//! ### Two conventions, one boundary
//! The wire speaks snake_case and wraps payloads under a root key (`{"photo": {...}}`).
//! Local state uses camelCase and bare records. All conversion happens in [`keys`], at the
//! edge of the dispatcher, and nowhere else.
//!
//! ### Validation failures are data
//! An HTTP 422 becomes [`CrudError::Validation`](sync::CrudError::Validation) holding a flat
//! `field -> message` map that a form can bind directly. Transport failures stay a separate
//! variant.
//!
//! ## 🚀 Core Concepts
//!
//! ### Deduplication
//! Concurrent fetches for the same wire path share one GET through the
//! [`InFlightCache`](cache::InFlightCache). Each caller still emits its own transitions.
//!
//! ### Optimistic writes
//! `WriteOptions { persist: false, .. }` completes a write locally without touching the
//! network. The reducer also tracks writes that are still pending on the server.
//!
//! ### Mocking
//! [`MockTransport`](mock::MockTransport) replaces the network in tests with a queue of
//! expected requests. See the [`mock`] module.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`sync`])
//! - **Role**: The four CRUD operations, their options and the transition protocol.
//! - **Key items**: [`CrudDispatcher`](sync::CrudDispatcher), [`Transition`](sync::Transition),
//!   [`Dispatch`](sync::Dispatch).
//!
//! ### 2. The State ([`state`])
//! - **Role**: Folds transitions into `{ meta, items }` per resource, and hosts that state in
//!   an actor.
//! - **Key items**: [`reducers_for`](state::reducers_for), [`StateStore`](state::StateStore).
//!
//! ### 3. The Leaves ([`keys`], [`validation`], [`inflect`], [`cache`])
//! - **Role**: Pure payload transforms, validation error normalization, and request
//!   coalescing.
//!
//! ### 4. The Edge ([`transport`], [`config`])
//! - **Role**: The network seam, the `reqwest` implementation and API configuration.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: Wires a dispatcher to a running store and shuts it down.
//! - **Key items**: [`SyncSystem`](lifecycle::SyncSystem), [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Point it at a real API
//! CRUD_SYNC_API_URL=http://localhost:3001/api/v1 cargo run
//! ```

pub mod cache;
pub mod config;
pub mod inflect;
pub mod keys;
pub mod lifecycle;
pub mod mock;
pub mod state;
pub mod sync;
pub mod transport;
pub mod validation;
