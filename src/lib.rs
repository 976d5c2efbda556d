pub mod app;
pub mod audio;
pub mod config;
pub mod render;
pub mod terminal;
pub mod visual;
