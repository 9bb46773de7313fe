pub mod action;
pub mod codec;
pub mod config;
pub mod problem;
pub mod progress;
pub mod storage;
pub mod str_interp;
pub mod style;
pub mod testing;

pub use crate::config::Config;
