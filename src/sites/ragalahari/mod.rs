//! Ragalahari 站点模块
//!
//! 按页面类型拆分为多个提取子模块，均为 `&Html` 上的纯函数。

mod album;
mod gallery;
mod listing;
mod selectors;

use regex::{Regex, RegexBuilder};
use scraper::ElementRef;
use url::Url;

use crate::core::config::SiteConfig;
use crate::core::error::{GalleryError, Result};
use crate::utils::normalize::first_srcset_candidate;
use crate::utils::resolve;

pub use self::album::AlbumPage;
pub use self::gallery::GalleryPage;
pub(crate) use self::selectors::SiteSelectors;

/// 源站占位缩略图
const PLACEHOLDER_THUMB: &str = "/img/galthumb.jpg";

/// Ragalahari 站点实现
pub struct Ragalahari {
    config: SiteConfig,
    base: Url,
    /// 相册页原图地址匹配 (依赖可配置的图片主机)
    photo_pattern: Regex,
}

impl Ragalahari {
    /// 创建新的站点实例
    pub fn new(config: SiteConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            GalleryError::Config(config::ConfigError::Message(format!(
                "invalid site.base_url {}: {}",
                config.base_url, e
            )))
        })?;

        let pattern = format!(
            r#"(?:https?:)?//{}/[^\s"'<>()]+?\.(?:jpe?g|png|webp)"#,
            regex::escape(&config.photo_host)
        );
        let photo_pattern = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                GalleryError::Config(config::ConfigError::Message(format!(
                    "invalid site.photo_host {}: {}",
                    config.photo_host, e
                )))
            })?;

        Ok(Self {
            config,
            base,
            photo_pattern,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// 规范化 URL
    #[inline]
    pub fn normalize(&self, path: &str) -> String {
        resolve(&self.base, path)
    }

    /// 首页 (最新图集)
    pub fn latest_url(&self) -> String {
        self.normalize("/actress/starzone.aspx")
    }

    /// A-Z 索引页，`a` 使用不带字母的入口
    pub fn letter_url(&self, letter: char) -> String {
        let letter = letter.to_ascii_lowercase();
        if letter == 'a' {
            self.normalize("/actress/starzonesearch.aspx")
        } else {
            self.normalize(&format!("/actress/{}/starzonesearch.aspx", letter))
        }
    }

    /// 站点主域 (去掉 `www.`)
    fn site_domain(&self) -> &str {
        let host = self.base.host_str().unwrap_or_default();
        host.strip_prefix("www.").unwrap_or(host)
    }

    /// 是否为本站页面地址
    pub fn is_site_url(&self, url: &Url) -> bool {
        let domain = self.site_domain();
        match url.host_str() {
            Some(host) => host == domain || host.ends_with(&format!(".{}", domain)),
            None => false,
        }
    }

    /// 按属性优先级读取图片地址并补全
    ///
    /// `data-srcset` > `srcset` > `data-src` > `src`，站点占位图视为缺失。
    fn image_source(&self, img: ElementRef<'_>) -> Option<String> {
        let el = img.value();
        let raw = ["data-srcset", "srcset", "data-src", "src"]
            .iter()
            .filter_map(|attr| el.attr(attr))
            .filter_map(first_srcset_candidate)
            .next()?;

        if raw == PLACEHOLDER_THUMB {
            return None;
        }

        Some(self.normalize(raw))
    }
}
