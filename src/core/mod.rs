pub mod camera;
pub mod config;
pub mod constants;
pub mod focus;
pub mod geo;
pub mod ready;
