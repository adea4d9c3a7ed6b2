//! 列表页提取 (首页 / A-Z 索引页)

use std::collections::{HashMap, HashSet};

use scraper::{ElementRef, Html};

use crate::core::model::{EntryKind, GalleryEntry};
use crate::utils::normalize::display_name;
use crate::utils::{derive_id, to_hd};

use super::{Ragalahari, SiteSelectors};

const GALLERY_PATH: &str = "/actress/";
const PROFILE_PATH: &str = "/stars/profile/";

impl Ragalahari {
    /// 首页模式：按文档顺序最多取 `latest_limit` 个图集
    pub fn extract_latest(&self, doc: &Html) -> Vec<GalleryEntry> {
        let scope = doc.root_element();
        let thumbs = self.thumbnail_map(scope);
        let s = SiteSelectors::get();

        let mut seen = HashSet::new();
        scope
            .select(&s.gallery_name)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                if !href.contains(GALLERY_PATH) {
                    return None;
                }
                let title = anchor_text(link)?;
                self.build_entry(href, &display_name(&title), &thumbs, EntryKind::Gallery)
            })
            .filter(|entry| seen.insert(entry.id.clone()))
            .take(self.config.latest_limit)
            .collect()
    }

    /// 索引页模式：不访问详情页，只产出列表条目
    pub fn extract_letter(&self, doc: &Html) -> Vec<GalleryEntry> {
        let s = SiteSelectors::get();
        let scope = doc
            .select(&s.galleries_section)
            .next()
            .unwrap_or_else(|| doc.root_element());
        let thumbs = self.thumbnail_map(scope);

        let mut seen = HashSet::new();
        scope
            .select(&s.gallery_name)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                let text = anchor_text(link)?;

                if href.contains(PROFILE_PATH) {
                    self.build_entry(href, &text, &thumbs, EntryKind::Profile)
                } else if href.contains(GALLERY_PATH) {
                    self.build_entry(href, &display_name(&text), &thumbs, EntryKind::Gallery)
                } else {
                    None
                }
            })
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect()
    }

    /// `a.galimg` 链接 → 缩略图 (首个出现者生效)
    pub(super) fn thumbnail_map(&self, scope: ElementRef<'_>) -> HashMap<String, String> {
        let s = SiteSelectors::get();
        let mut map = HashMap::new();

        for link in scope.select(&s.gal_img) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !(href.contains(GALLERY_PATH) || href.contains(PROFILE_PATH)) || map.contains_key(href) {
                continue;
            }
            if let Some(thumb) = link
                .select(&s.img)
                .next()
                .and_then(|img| self.image_source(img))
            {
                map.insert(href.to_string(), thumb);
            }
        }

        map
    }

    fn build_entry(
        &self,
        href: &str,
        name: &str,
        thumbs: &HashMap<String, String>,
        kind: EntryKind,
    ) -> Option<GalleryEntry> {
        let id = derive_id(href)?;
        if name.is_empty() {
            return None;
        }

        let thumbnail = thumbs.get(href).cloned().unwrap_or_else(|| {
            let stem = href.strip_suffix(".aspx").unwrap_or(href);
            self.normalize(&format!("{}-thumbnail.jpg", stem))
        });

        Some(GalleryEntry::new(
            id,
            name.to_string(),
            to_hd(&thumbnail),
            self.normalize(href),
            kind,
        ))
    }
}

/// 去除首尾空白后的锚点文本，空文本视为缺失
pub(super) fn anchor_text(link: ElementRef<'_>) -> Option<String> {
    let text = link.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
