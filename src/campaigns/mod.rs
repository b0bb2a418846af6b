pub mod api;
pub mod handlers;
mod models;

pub use handlers::router;
pub use models::Campaign;
