pub mod local_store;
pub mod metadata;
pub mod views;
