//! Web front-end.
//!
//! Serves the pages the Drive UI opens the app with, plus a JSON profile
//! route and a health probe.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod session;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
pub use session::{DriveSession, SESSION_COOKIE};
