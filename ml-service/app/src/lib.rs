#![warn(rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod healthcheck;
pub mod model;
pub mod preprocess;
pub mod training;

pub use healthcheck::{healthcheck, healthcheck_with_port};
