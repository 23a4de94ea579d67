// handlers/protected/mod.rs - Protected handlers (bearer access token required)
//
// Every handler receives the caller as an `AuthUser` extension and only ever
// touches rows that caller owns. Rows owned by someone else answer 404, the
// same as rows that do not exist.

pub mod projects; // /api/projects/, /api/projects/:id/
pub mod tasks; // /api/tasks/, /api/tasks/:id/
pub mod utils;
