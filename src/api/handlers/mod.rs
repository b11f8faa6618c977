// src/api/handlers/mod.rs
mod health;

pub use health::health_check;
pub use run_tests::run_tests;
