// public modules
pub mod config;
pub mod core;
pub mod predict;
pub mod strategies;

// private modules
mod setters;
