pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod range;
pub mod reader;
pub mod render;
pub mod report;
pub mod text;
pub mod util;

pub use error::{Error, Result};
