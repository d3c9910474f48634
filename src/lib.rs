pub mod config;
pub mod models;
pub mod image;
pub mod classify;
pub mod web;
pub mod utils;

// 重新导出主要类型
pub use classify::{Classification, Mood};
pub use config::Config;
pub use utils::error::MoodError;

pub type Result<T> = std::result::Result<T, MoodError>;
