//! 会话状态管理 (Session Management)
//!
//! 维护每个请求都会携带的身份标识头部。

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::core::config::HttpConfig;
use crate::core::error::{GalleryError, Result};

/// 网络会话容器
#[derive(Debug, Default, Clone)]
pub struct Session {
    /// 身份标识 (User-Agent)
    ua: String,
    /// 额外注入的头部集
    extra_headers: HeaderMap,
}

impl Session {
    pub fn new(ua: impl Into<String>) -> Self {
        Self {
            ua: ua.into(),
            extra_headers: HeaderMap::new(),
        }
    }

    /// 由网络配置构建，非法的头部名或值视为配置错误
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let mut session = Self::new(config.user_agent.clone());
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid_header(name, e))?;
            let value = HeaderValue::from_str(value).map_err(|e| invalid_header(name.as_str(), e))?;
            session.extra_headers.insert(name, value);
        }
        Ok(session)
    }

    pub fn ua(&self) -> &str {
        &self.ua
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.extra_headers
    }
}

fn invalid_header(name: &str, e: impl std::fmt::Display) -> GalleryError {
    GalleryError::Config(config::ConfigError::Message(format!(
        "invalid http.headers entry {}: {}",
        name, e
    )))
}
