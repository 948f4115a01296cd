pub mod commands;
pub mod config;
pub mod env;
pub mod lifecycle;
pub mod state;
