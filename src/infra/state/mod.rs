pub mod json_state_store;

pub use json_state_store::JsonStateStore;
