//! 相册分页提取 (Album page)

use indexmap::IndexSet;
use scraper::Html;
use url::Url;

use crate::utils::normalize::is_cover_thumb;
use crate::utils::{is_filtered, resolve, to_hd};

use super::{Ragalahari, SiteSelectors};

/// 单个相册分页的提取结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumPage {
    /// 本页原图，按文档顺序且页内去重
    pub photos: Vec<String>,
    /// 下一页绝对地址
    pub next: Option<String>,
}

impl Ragalahari {
    /// 相册页模式
    ///
    /// 原图地址可能出现在 `img`、链接或内联脚本中，因此直接扫描原始标记；
    /// 下一页链接则从解析后的文档中定位。
    pub fn extract_album_page(&self, raw: &str, doc: &Html, page_url: &Url) -> AlbumPage {
        let mut photos = IndexSet::new();

        for m in self.photo_pattern.find_iter(raw) {
            let url = resolve(page_url, m.as_str());
            if is_cover_thumb(&url) {
                continue;
            }
            let hd = to_hd(&url);
            if is_filtered(&hd) {
                continue;
            }
            photos.insert(hd);
        }

        let s = SiteSelectors::get();
        let next = doc
            .select(&s.pagination_next)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| {
                !href.is_empty() && !href.starts_with('#') && !href.to_ascii_lowercase().starts_with("javascript:")
            })
            .map(|href| resolve(page_url, href))
            .filter(|next| next != page_url.as_str());

        AlbumPage {
            photos: photos.into_iter().collect(),
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SiteConfig;

    fn site() -> Ragalahari {
        Ragalahari::new(SiteConfig::default()).unwrap()
    }

    fn extract(html: &str, url: &str) -> AlbumPage {
        let page_url = Url::parse(url).unwrap();
        site().extract_album_page(html, &Html::parse_document(html), &page_url)
    }

    #[test]
    fn test_album_page_photos_and_next() {
        let html = r##"<html><body>
            <a href="https://starzone.ragalahari.com/a/7/sam3.jpg"><img src="https://starzone.ragalahari.com/a/7/sam3t.jpg"></a>
            <img src="https://starzone.ragalahari.com/a/7/sam1t.jpg">
            <img src="//starzone.ragalahari.com/a/7/sam2T.JPG">
            <img src="https://starzone.ragalahari.com/a/7/samthumb.jpg">
            <img src="https://starzone.ragalahari.com/a/7/logo-strip.png">
            <img src="https://szcdn.ragalahari.com/a/7/other.jpg">
            <script>var next = "https://starzone.ragalahari.com/a/7/sam4t.jpg";</script>
            <ul class="pagination"><li class="active"><a href="#">1</a></li><li><a href="sam-2.aspx">2</a></li></ul>
        </body></html>"##;
        let page = extract(html, "https://www.ragalahari.com/actress/7/sam.aspx");

        assert_eq!(
            page.photos,
            vec![
                "https://starzone.ragalahari.com/a/7/sam3.jpg",
                "https://starzone.ragalahari.com/a/7/sam1.jpg",
                "https://starzone.ragalahari.com/a/7/sam2T.JPG",
                "https://starzone.ragalahari.com/a/7/sam4.jpg",
            ]
        );
        assert_eq!(
            page.next.as_deref(),
            Some("https://www.ragalahari.com/actress/7/sam-2.aspx")
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let html = r#"<html><body>
            <img src="https://starzone.ragalahari.com/a/7/sam9t.jpg">
            <a class="next" href="javascript:void(0)">Next</a>
            <a rel="next" href="https://www.ragalahari.com/actress/7/sam.aspx">Self</a>
        </body></html>"#;
        let page = extract(html, "https://www.ragalahari.com/actress/7/sam.aspx");

        assert_eq!(page.photos, vec!["https://starzone.ragalahari.com/a/7/sam9.jpg"]);
        assert_eq!(page.next, None);
    }
}
