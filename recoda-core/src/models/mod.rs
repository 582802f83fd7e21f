pub mod artifact;
pub mod audio_models;
pub mod config;
pub mod error;
pub mod events;
pub mod recording_result;
pub mod remote;
pub mod state;
