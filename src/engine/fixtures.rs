//! 测试夹具：内存页面来源与页面构造器

use std::collections::HashMap;

use async_trait::async_trait;
use http::StatusCode;
use parking_lot::Mutex;

use crate::core::error::{FetchCause, FetchError};
use crate::interfaces::PageSource;

/// 预置页面的内存来源，记录每次请求
#[derive(Default)]
pub struct FakeSource {
    pages: HashMap<String, Result<String, FetchCause>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), Ok(html.into()));
        self
    }

    pub fn failing(mut self, url: &str, cause: FetchCause) -> Self {
        self.pages.insert(url.to_string(), Err(cause));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().push(url.to_string());
        match self.pages.get(url) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(cause)) => Err(FetchError::new(url, cause.clone(), 4)),
            None => Err(FetchError::new(
                url,
                FetchCause::Status(StatusCode::NOT_FOUND),
                1,
            )),
        }
    }
}

/// 首页/索引页中的一个图集预告块
pub fn teaser(id: u32, title: &str) -> String {
    format!(
        r#"<div class="gal">
             <a class="galimg" href="/actress/{id}/g-{id}.aspx"><img src="//szcdn.ragalahari.com/g/{id}/c{id}t.jpg"></a>
             <a class="galleryname" href="/actress/{id}/g-{id}.aspx">{title}</a>
           </div>"#
    )
}

pub fn listing_page(teasers: &[(u32, &str)]) -> String {
    let body: String = teasers.iter().map(|(id, title)| teaser(*id, title)).collect();
    format!("<html><body><div id=\"galleries\">{}</div></body></html>", body)
}

/// 相册分页：`count` 张缩略图，可选下一页链接
pub fn album_page(album: u32, page: u32, count: u32, next: Option<&str>) -> String {
    let imgs: String = (1..=count)
        .map(|i| {
            format!(
                r#"<img src="https://starzone.ragalahari.com/a/{album}/p{page}-{i}t.jpg">"#
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a rel="next" href="{href}">Next</a>"#))
        .unwrap_or_default();
    format!("<html><body>{}{}</body></html>", imgs, next)
}
