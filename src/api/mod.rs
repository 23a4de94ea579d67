// Wire formats: outbound views and inbound payloads
pub mod format;
pub mod payload;
