//! 页面来源接口
//!
//! 分页器与服务层只依赖该 Trait，生产环境由 `HttpService` 实现。

use async_trait::async_trait;

use crate::core::error::FetchError;

/// 页面来源 (Page Source)
#[async_trait]
pub trait PageSource: Send + Sync {
    /// 获取页面 HTML 文本
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}
