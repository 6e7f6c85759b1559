//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` that reads its filter from
//! `RUST_LOG` and hides module paths (`with_target(false)`).
//!
//! ## What Gets Traced
//!
//! - **Operations**: one span per fetch/create/update/destroy, carrying the resource name.
//! - **Requests**: method, path and status of every request at `debug`.
//! - **Deduplication**: cache attach/settle per path at `debug`.
//! - **Store**: startup, shutdown and every applied transition at `debug`.
//! - **Failures**: validation rejections at `warn`, transport failures at `error`.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Operation outcomes only
//! RUST_LOG=info cargo run
//!
//! # Requests, cache and transitions
//! RUST_LOG=debug cargo run
//!
//! # Only the dispatcher
//! RUST_LOG=crud_sync::sync=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a coalesced fetch reads like:
//!
//! ```text
//! DEBUG fetch: Acquire resource="photos" path="photos" attached=false
//! DEBUG fetch: Acquire resource="photos" path="photos" attached=true
//! DEBUG fetch: Sending request resource="photos" method=GET path="photos"
//! DEBUG fetch: Settled resource="photos" path="photos"
//!  INFO fetch: Fetched resource="photos" path="photos" count=2
//!  INFO fetch: Fetched resource="photos" path="photos" count=2
//! ```

/// Initializes structured logging. Call once at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
