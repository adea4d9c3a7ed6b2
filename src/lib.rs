//! Ragalahari starzone 图集提取核心
//!
//! 抓取 → 解析 → 规范化 → 分页 → 缓存。入口为 [`engine::GalleryService`]。

pub mod core;
pub mod engine;
pub mod interfaces;
pub mod network;
pub mod sites;
pub mod utils;

pub use crate::core::config::AppConfig;
pub use crate::core::error::{GalleryError, Result};
pub use crate::engine::GalleryService;
