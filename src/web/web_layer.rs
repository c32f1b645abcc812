// Web layer - the small HTTP server that runs next to the bot.

pub mod routes;
pub mod server;

pub use routes::{create_router, WebState};
