pub mod analysis;
pub mod audio;
pub mod cancel;
pub mod config;
pub mod text;
pub mod video;
