//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 的反序列化及其层级结构映射，支持环境变量覆盖与默认值回退机制。

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bon::Builder;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::error::{GalleryError, Result};

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct AppConfig {
    /// 网络抓取参数
    #[serde(default)]
    #[builder(default)]
    pub http: HttpConfig,

    /// 内存缓存参数
    #[serde(default)]
    #[builder(default)]
    pub cache: CacheConfig,

    /// 源站结构参数
    #[serde(default)]
    #[builder(default)]
    pub site: SiteConfig,
}

/// 网络层配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct HttpConfig {
    /// 每个请求携带的身份标识 (User-Agent)
    #[serde(default = "default_user_agent")]
    #[builder(default = default_user_agent())]
    pub user_agent: String,
    /// 单次请求总超时 (秒)
    #[serde(default = "default_timeout_secs")]
    #[builder(default = default_timeout_secs())]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    #[builder(default = default_connect_timeout_secs())]
    pub connect_timeout_secs: u64,
    /// 瞬时故障的额外重试次数
    #[serde(default = "default_max_retries")]
    #[builder(default = default_max_retries())]
    pub max_retries: u32,
    /// 线性退避基数 (毫秒)
    #[serde(default = "default_retry_backoff_ms")]
    #[builder(default = default_retry_backoff_ms())]
    pub retry_backoff_ms: u64,
    /// 全局在途请求上限
    #[serde(default = "default_concurrency")]
    #[builder(default = default_concurrency())]
    pub concurrency: usize,
    #[serde(default = "default_pool_max_idle")]
    #[builder(default = default_pool_max_idle())]
    pub pool_max_idle_per_host: usize,
    /// 每个请求额外携带的头部 (如 `referer`)
    #[serde(default)]
    #[builder(default)]
    pub headers: HashMap<String, String>,
}

/// 缓存配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub enabled: bool,
    /// 条目存活时间 (秒)
    #[serde(default = "default_ttl_secs")]
    #[builder(default = default_ttl_secs())]
    pub ttl_secs: u64,
}

/// 源站配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    #[builder(default = default_base_url())]
    pub base_url: String,
    /// 允许作为非缩略图直接收录的图片 CDN 主机
    #[serde(default = "default_image_hosts")]
    #[builder(default = default_image_hosts())]
    pub image_hosts: Vec<String>,
    /// 相册原图所在主机
    #[serde(default = "default_photo_host")]
    #[builder(default = default_photo_host())]
    pub photo_host: String,
    /// 源站 A-Z 索引缺失的字母
    #[serde(default = "default_excluded_letter")]
    #[builder(default = default_excluded_letter())]
    pub excluded_letter: char,
    /// 首页条目上限
    #[serde(default = "default_latest_limit")]
    #[builder(default = default_latest_limit())]
    pub latest_limit: usize,
    /// 单个相册最多跟随的分页数
    #[serde(default = "default_max_album_pages")]
    #[builder(default = default_max_album_pages())]
    pub max_album_pages: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_concurrency() -> usize {
    8
}
fn default_pool_max_idle() -> usize {
    16
}
fn default_true() -> bool {
    true
}
fn default_ttl_secs() -> u64 {
    3600
}
fn default_base_url() -> String {
    "https://www.ragalahari.com".to_string()
}
fn default_image_hosts() -> Vec<String> {
    vec!["szcdn.ragalahari.com".to_string()]
}
fn default_photo_host() -> String {
    "starzone.ragalahari.com".to_string()
}
fn default_excluded_letter() -> char {
    'q'
}
fn default_latest_limit() -> usize {
    20
}
fn default_max_album_pages() -> usize {
    50
}

impl AppConfig {
    /// 从文件系统与环境变量中加载并解析配置
    ///
    /// 环境变量形如 `STARZONE__HTTP__MAX_RETRIES=5`，优先级高于 `config.toml`。
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let builder = Config::builder();

        let builder = if config_path.exists() {
            builder.add_source(File::from(config_path))
        } else {
            builder
        };

        let settings = builder
            .add_source(
                Environment::with_prefix("STARZONE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(GalleryError::Config)?;
        settings.try_deserialize().map_err(GalleryError::Config)
    }
}
