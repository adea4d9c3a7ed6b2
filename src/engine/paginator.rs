//! 相册分页遍历 (Paginator)

use std::collections::HashSet;

use scraper::Html;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::core::error::{FetchCause, FetchError, Result};
use crate::core::model::PhotoList;
use crate::interfaces::PageSource;
use crate::sites::{AlbumPage, Ragalahari};

/// 一次相册遍历的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhotoCollection {
    /// 按访问顺序拼接，不做跨页去重
    pub photos: PhotoList,
    pub pages_visited: usize,
    /// 为假时表示后续分页失败或查询被取消，只得到了前缀
    pub complete: bool,
}

/// 顺序抓取相册的所有分页
pub struct Paginator<'a> {
    source: &'a dyn PageSource,
    site: &'a Ragalahari,
    shutdown: &'a CancellationToken,
    max_pages: usize,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a dyn PageSource, site: &'a Ragalahari, shutdown: &'a CancellationToken) -> Self {
        Self {
            source,
            site,
            shutdown,
            max_pages: site.config().max_album_pages.max(1),
        }
    }

    /// 首页失败直接返回错误；后续分页失败返回已收集的部分
    pub async fn collect_all_photos(&self, album_url: &str) -> Result<PhotoCollection> {
        let mut photos = PhotoList::new();
        let mut visited = HashSet::new();
        let mut next = Some(album_url.to_string());
        let mut pages = 0usize;
        let mut complete = true;

        while let Some(url) = next.take() {
            if pages >= self.max_pages {
                warn!("相册 {} 已达到分页上限 {}，停止翻页", album_url, self.max_pages);
                break;
            }
            if !visited.insert(canonical(&url)) {
                debug!("分页链接回到已访问页面 {}，停止翻页", url);
                break;
            }
            if pages > 0 && self.shutdown.is_cancelled() {
                warn!("相册 {} 查询已取消，返回前 {} 页", album_url, pages);
                complete = false;
                break;
            }

            match self.fetch_page(&url).await {
                Ok(page) => {
                    pages += 1;
                    debug!("第 {} 页 {}: {} 张", pages, url, page.photos.len());
                    photos.extend(page.photos);
                    next = page.next;
                }
                Err(e) if pages == 0 => return Err(e.into()),
                Err(e) => {
                    warn!("相册 {} 第 {} 页失败，返回前 {} 页: {}", album_url, pages + 1, pages, e);
                    complete = false;
                    break;
                }
            }
        }

        Ok(PhotoCollection {
            photos,
            pages_visited: pages,
            complete,
        })
    }

    async fn fetch_page(&self, url: &str) -> std::result::Result<AlbumPage, FetchError> {
        let page_url = Url::parse(url).map_err(|_| FetchError::new(url, FetchCause::InvalidUrl, 0))?;
        let raw = self.source.fetch_html(url).await?;

        let page = {
            let doc = Html::parse_document(&raw);
            self.site.extract_album_page(&raw, &doc, &page_url)
        };
        Ok(page)
    }
}

/// 同一页面的不同写法 (主机大小写、默认端口) 归一为同一个键
fn canonical(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}
