// handlers/public/auth/mod.rs - Public authentication handlers

pub mod register; // POST /api/register/ - create an account
pub mod token; // POST /api/token/, POST /api/token/refresh/

pub use register::register_post;
pub use token::{refresh_post, token_post};
