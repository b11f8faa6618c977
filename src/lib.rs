// src/lib.rs
pub mod api;
pub mod archive;
pub mod banner;
pub mod build;
pub mod config;
pub mod errors;
pub mod models;
pub mod reports;
pub mod runner;
