// Infra layer: storage behind the core's store traits.

#[path = "state/mod.rs"]
pub mod state;
