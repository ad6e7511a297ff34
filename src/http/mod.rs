//! HTTP surface (spec §6). Router construction follows the teacher's
//! `Router::new() + CorsLayer + TraceLayer + .with_state` shape.

pub mod auth;
pub mod channels;
pub mod extras;
pub mod files;
pub mod health;
pub mod library;
pub mod media;
pub mod playlists;
pub mod progress;
pub mod routes;
pub mod sections;
pub mod shows;
pub mod sources;
pub mod state;
pub mod stream;
pub mod watchlist;

pub use routes::create_router;
pub use state::AppState;
