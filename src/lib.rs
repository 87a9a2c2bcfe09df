pub mod analyzer;
pub mod api;
pub mod config;
pub mod data_models;
pub mod enricher;
pub mod error;
pub mod pool;
pub mod provider;
pub mod ranking;
pub mod scoring;
pub mod service;
