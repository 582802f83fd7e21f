pub mod audio_graph;
pub mod capture_delegate;
pub mod capture_provider;
pub mod encoder;
pub mod media;
pub mod remote;
pub mod store;
