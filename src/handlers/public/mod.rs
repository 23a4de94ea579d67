// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, account registration and the health probe.

pub mod auth;
pub mod health;

pub use health::health_get;
