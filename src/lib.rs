// lib.rs - Library exports for integration tests

pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod math;
pub mod models;
pub mod web;
