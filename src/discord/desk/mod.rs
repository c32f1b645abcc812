pub mod custom_ids;
pub mod interactions;
pub mod views;

pub use interactions::handle_interaction;
