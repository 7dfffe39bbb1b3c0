//! Middleware for the web front-end.

pub mod security;

pub use security::security_headers;
