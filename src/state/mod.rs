//! Local state for synchronized resources: the pure reducer and the store actor that
//! hosts it.

pub mod reducer;
pub mod store;

pub use reducer::{
    is_fetching, is_fetching_initial, items_reducer, last_updated_at, meta_reducer, reducers_for,
    Items, Meta, Pending, ResourceReducer, ResourceState,
};
pub use store::{StateStore, StoreClient, StoreError};
