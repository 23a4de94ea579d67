// handlers/mod.rs - two-tier handler layout
//
// Public (no auth) -> Protected (bearer access token, caller-scoped data)
pub mod public; // Tier 1: registration, token endpoints, health
pub mod protected; // Tier 2: /api/projects/*, /api/tasks/*
