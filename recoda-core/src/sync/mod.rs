pub mod engine;
pub mod manifest;
pub mod session;
