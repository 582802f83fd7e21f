pub mod audio_mixer;
pub mod format;
pub mod levels;
