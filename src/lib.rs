pub mod app;
pub mod canvas;
pub mod color;
pub mod compositor;
pub mod config;
pub mod easing;
pub mod export;
pub mod palette;
pub mod prefs;
pub mod render;
pub mod ripple;
pub mod seed;
pub mod session;
pub mod simulation;
pub mod terminal;
