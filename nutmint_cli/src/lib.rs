pub mod commands;
pub mod config;
pub mod demo;
pub mod error;
pub mod mint_config;
