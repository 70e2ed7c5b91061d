pub mod api;
pub mod config;
pub mod models;
pub mod responses;
pub mod routes;
pub mod settings;
pub mod state;
pub mod store;
pub mod utils;

pub use state::AppState;
