//! 图集详情页提取 (Actress / Album-listing mode)

use std::collections::HashSet;

use indexmap::IndexSet;
use scraper::Html;

use crate::core::error::{GalleryError, Result};
use crate::core::model::Album;
use crate::utils::normalize::{cover_to_first_photo, host_matches, is_cover_thumb, title_from_slug};
use crate::utils::{is_filtered, to_hd};

use super::listing::anchor_text;
use super::{Ragalahari, SiteSelectors};

const BIO_MAX_CHARS: usize = 500;
const FALLBACK_IMAGE_ALBUMS: usize = 5;

/// 详情页的部分记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryPage {
    /// 页面主标题 (`h1`)，缺失时由调用方回退
    pub heading: Option<String>,
    pub bio: Option<String>,
    pub height: Option<String>,
    pub birth_date: Option<String>,
    pub images: Vec<String>,
    pub albums: Vec<Album>,
}

impl Ragalahari {
    /// 详情页模式
    ///
    /// `include_images` 为真时才收集页面图片 (最新图集模式)；相册列表始终提取。
    pub fn extract_gallery(&self, doc: &Html, include_images: bool) -> Result<GalleryPage> {
        let s = SiteSelectors::get();

        let has_content = doc
            .select(&s.body)
            .next()
            .is_some_and(|body| body.children().next().is_some());
        if !has_content {
            return Err(GalleryError::Extraction("gallery page has an empty body".into()));
        }

        let albums = self.extract_albums(doc);
        let images = if include_images {
            self.extract_images(doc, &albums)
        } else {
            Vec::new()
        };

        let heading = doc
            .select(&s.heading)
            .next()
            .and_then(anchor_text);

        let text = doc.root_element().text().collect::<String>();

        Ok(GalleryPage {
            heading,
            bio: self.extract_bio(doc),
            height: labelled_line(&text, "Height:"),
            birth_date: labelled_line(&text, "Born:").and_then(|born| {
                let parts: Vec<&str> = born.split(',').collect();
                (parts.len() >= 2).then(|| parts[..2].join(",").trim().to_string())
            }),
            images,
            albums,
        })
    }

    /// 相关相册：按 href 去重，跳过资料页与搜索页
    fn extract_albums(&self, doc: &Html) -> Vec<Album> {
        let s = SiteSelectors::get();
        let thumbs = self.thumbnail_map(doc.root_element());
        let mut seen = HashSet::new();

        doc.select(&s.gallery_name)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                let lower = href.to_ascii_lowercase();
                if !href.contains("/actress/") || lower.contains("profile") || lower.contains("search") {
                    return None;
                }
                if seen.contains(href) {
                    return None;
                }

                let name = match anchor_text(link) {
                    Some(name) if name.chars().count() >= 3 => name,
                    _ => title_from_slug(href),
                };
                if name.chars().count() <= 3 {
                    return None;
                }

                seen.insert(href.to_string());
                Some(Album {
                    name,
                    url: self.normalize(href),
                    thumbnail: thumbs.get(href).map(|t| to_hd(t)),
                })
            })
            .collect()
    }

    /// 页面图片：缩略图改写为原图，其余仅收录图片 CDN 上的资源
    fn extract_images(&self, doc: &Html, albums: &[Album]) -> Vec<String> {
        let s = SiteSelectors::get();
        let mut images = IndexSet::new();

        for img in doc.select(&s.img) {
            let Some(src) = self.image_source(img) else {
                continue;
            };
            let alt = img.value().attr("alt").unwrap_or_default();
            if is_filtered(&src) || is_filtered(alt) || is_cover_thumb(&src) {
                continue;
            }

            let hd = to_hd(&src);
            if hd != src || host_matches(&src, &self.config.image_hosts) {
                images.insert(hd);
            }
        }

        if images.is_empty() {
            images.extend(
                albums
                    .iter()
                    .take(FALLBACK_IMAGE_ALBUMS)
                    .filter_map(|album| album.thumbnail.as_deref())
                    .map(|thumb| {
                        if is_cover_thumb(thumb) {
                            cover_to_first_photo(thumb)
                        } else {
                            thumb.to_string()
                        }
                    }),
            );
        }

        images.into_iter().collect()
    }

    /// 简介：取前两段，截断到 500 字符
    fn extract_bio(&self, doc: &Html) -> Option<String> {
        let s = SiteSelectors::get();
        let container = doc.select(&s.bio_container).next()?;

        let bio = container
            .select(&s.paragraph)
            .take(2)
            .filter_map(anchor_text)
            .collect::<Vec<_>>()
            .join(" ");

        if bio.is_empty() {
            return None;
        }
        Some(bio.chars().take(BIO_MAX_CHARS).collect())
    }
}

/// 页面文本中 `label` 之后到行尾的内容
fn labelled_line(text: &str, label: &str) -> Option<String> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    let value = rest[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}
