//! 图集服务 (Gallery Service)
//!
//! 对外的查询入口：参数校验 → 缓存 → 抓取 → 提取 → 写回缓存。
//! 校验失败的请求不会触达网络。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::core::config::AppConfig;
use crate::core::error::{GalleryError, Result};
use crate::core::model::{ActressDetail, Album, GalleryEntry};
use crate::engine::cache::{CacheKey, CachedPayload, TtlCache};
use crate::engine::paginator::{Paginator, PhotoCollection};
use crate::interfaces::PageSource;
use crate::network::{HttpService, Session};
use crate::sites::{GalleryPage, Ragalahari};
use crate::utils::normalize::display_name;

const MIN_QUERY_CHARS: usize = 2;
const MAX_SEARCH_LIMIT: usize = 100;
const ID_PREFIX: &str = "rh_";

/// 查询编排器，进程内只构造一次
pub struct GalleryService {
    source: Arc<dyn PageSource>,
    site: Ragalahari,
    cache: TtlCache<CacheKey, CachedPayload>,
    ttl: Duration,
    shutdown: CancellationToken,
}

impl GalleryService {
    /// 使用真实 HTTP 抓取器构建服务
    pub fn new(config: AppConfig) -> Result<Self> {
        let shutdown = CancellationToken::new();
        let session = Arc::new(Session::from_config(&config.http)?);
        let http = HttpService::new(config.http.clone(), session, shutdown.clone())?;
        Self::assemble(config, Arc::new(http), shutdown)
    }

    /// 使用自定义页面来源构建服务
    pub fn with_source(config: AppConfig, source: Arc<dyn PageSource>) -> Result<Self> {
        Self::assemble(config, source, CancellationToken::new())
    }

    fn assemble(config: AppConfig, source: Arc<dyn PageSource>, shutdown: CancellationToken) -> Result<Self> {
        Ok(Self {
            source,
            site: Ragalahari::new(config.site)?,
            cache: TtlCache::new(config.cache.enabled),
            ttl: config.cache.ttl(),
            shutdown,
        })
    }

    /// 取消令牌，触发后在途查询尽快返回
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// 首页最新图集
    pub async fn latest(&self) -> Result<Vec<GalleryEntry>> {
        if let Some(entries) = self.cached_entries(&CacheKey::Latest) {
            return Ok(entries);
        }

        let url = self.site.latest_url();
        let entries = self.fetch_with(&url, |doc| self.site.extract_latest(doc)).await?;
        info!("最新图集: {} 个条目", entries.len());

        self.cache
            .put(CacheKey::Latest, CachedPayload::Entries(entries.clone()), self.ttl);
        Ok(entries)
    }

    /// 按首字母浏览
    pub async fn browse_by_letter(&self, letter: &str) -> Result<Vec<GalleryEntry>> {
        let letter = self.validate_letter(letter)?;
        let key = CacheKey::Letter(letter);
        if let Some(entries) = self.cached_entries(&key) {
            return Ok(entries);
        }

        let url = self.site.letter_url(letter);
        let entries = self.fetch_with(&url, |doc| self.site.extract_letter(doc)).await?;
        info!("字母 {}: {} 个条目", letter, entries.len());

        self.cache.put(key, CachedPayload::Entries(entries.clone()), self.ttl);
        Ok(entries)
    }

    /// 条目详情
    ///
    /// 条目必须出现在某个未过期的列表缓存中；只有来自首页的条目才收集图片。
    pub async fn actress_detail(&self, id: &str) -> Result<ActressDetail> {
        validate_id(id)?;
        let (entry, with_images) = self
            .find_entry(id)
            .ok_or_else(|| GalleryError::NotFound(format!("Actress {} not found", id)))?;

        let key = CacheKey::Actress {
            id: id.to_string(),
            with_images,
        };
        if let Some(payload) = self.cache.get(&key)
            && let CachedPayload::Detail(detail) = payload.as_ref()
        {
            debug!("缓存命中: {:?}", key);
            return Ok(detail.clone());
        }
        debug!("缓存未命中: {:?}", key);

        let page = self
            .fetch_with(&entry.url, |doc| self.site.extract_gallery(doc, with_images))
            .await??;
        let detail = build_detail(entry, page);
        info!(
            "详情 {}: {} 张图片, {} 个相册",
            id,
            detail.images.len(),
            detail.albums.len()
        );

        self.cache.put(key, CachedPayload::Detail(detail.clone()), self.ttl);
        Ok(detail)
    }

    /// 条目的相关相册
    pub async fn actress_albums(&self, id: &str) -> Result<Vec<Album>> {
        Ok(self.actress_detail(id).await?.albums)
    }

    /// 相册内全部原图，只有完整遍历的结果会写入缓存
    pub async fn album_photos(&self, album_url: &str) -> Result<PhotoCollection> {
        let album_url = self.validate_album_url(album_url)?;
        let key = CacheKey::AlbumPhotos(album_url.clone());
        if let Some(payload) = self.cache.get(&key)
            && let CachedPayload::Photos(collection) = payload.as_ref()
        {
            debug!("缓存命中: {:?}", key);
            return Ok(collection.clone());
        }
        debug!("缓存未命中: {:?}", key);

        let collection = Paginator::new(self.source.as_ref(), &self.site, &self.shutdown)
            .collect_all_photos(&album_url)
            .await?;
        info!(
            "相册 {}: {} 页, {} 张图片{}",
            album_url,
            collection.pages_visited,
            collection.photos.len(),
            if collection.complete { "" } else { " (不完整)" }
        );

        if collection.complete {
            self.cache
                .put(key, CachedPayload::Photos(collection.clone()), self.ttl);
        }
        Ok(collection)
    }

    /// 在已缓存的列表中按名字搜索，不访问网络
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<GalleryEntry>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(GalleryError::Validation(format!(
                "Query must be at least {} characters",
                MIN_QUERY_CHARS
            )));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(GalleryError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }

        let needle = query.to_lowercase();
        let listings = self.listings();
        let mut seen = HashSet::new();
        let results: Vec<GalleryEntry> = listings
            .iter()
            .flat_map(|payload| payload.entries())
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .filter(|entry| seen.insert(entry.id.as_str()))
            .take(limit)
            .cloned()
            .collect();

        info!("搜索 {:?}: {} 条结果", query, results.len());
        Ok(results)
    }

    /// 抓取页面并在同步块内完成解析
    async fn fetch_with<T>(&self, url: &str, extract: impl FnOnce(&Html) -> T) -> Result<T> {
        let raw = self.source.fetch_html(url).await?;
        let doc = Html::parse_document(&raw);
        Ok(extract(&doc))
    }

    fn cached_entries(&self, key: &CacheKey) -> Option<Vec<GalleryEntry>> {
        let payload = self.cache.get(key);
        match payload.as_deref() {
            Some(CachedPayload::Entries(entries)) => {
                debug!("缓存命中: {:?}", key);
                Some(entries.clone())
            }
            _ => {
                debug!("缓存未命中: {:?}", key);
                None
            }
        }
    }

    /// 未过期的列表载荷，按首次写入顺序 (不受缓存开关影响)
    fn listings(&self) -> Vec<Arc<CachedPayload>> {
        self.cache
            .live_entries()
            .into_iter()
            .filter(|(key, _)| matches!(key, CacheKey::Latest | CacheKey::Letter(_)))
            .map(|(_, payload)| payload)
            .collect()
    }

    /// 首页优先，其次各字母索引
    fn find_entry(&self, id: &str) -> Option<(GalleryEntry, bool)> {
        let live = self.cache.live_entries();
        let lookup = |from_latest: bool| {
            live.iter()
                .filter(|(key, _)| match key {
                    CacheKey::Latest => from_latest,
                    CacheKey::Letter(_) => !from_latest,
                    _ => false,
                })
                .find_map(|(_, payload)| payload.entries().iter().find(|e| e.id == id).cloned())
        };

        lookup(true)
            .map(|entry| (entry, true))
            .or_else(|| lookup(false).map(|entry| (entry, false)))
    }

    fn validate_letter(&self, raw: &str) -> Result<char> {
        let mut chars = raw.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_lowercase(),
            _ => {
                return Err(GalleryError::Validation(format!(
                    "Letter must be a single character a-z, got {:?}",
                    raw
                )));
            }
        };

        if letter == self.site.config().excluded_letter.to_ascii_lowercase() {
            return Err(GalleryError::Validation(format!(
                "Letter '{}' has no index page",
                letter
            )));
        }
        Ok(letter)
    }

    /// 返回规范化后的相册地址 (缓存键)
    fn validate_album_url(&self, raw: &str) -> Result<String> {
        let url = Url::parse(raw.trim())
            .map_err(|_| GalleryError::Validation(format!("Invalid album url: {}", raw)))?;

        if !matches!(url.scheme(), "http" | "https") || !self.site.is_site_url(&url) {
            return Err(GalleryError::Validation(format!(
                "Album url must be an http(s) page on {}",
                self.site.base_url()
            )));
        }
        Ok(url.to_string())
    }
}

fn validate_id(id: &str) -> Result<()> {
    let valid = id
        .strip_prefix(ID_PREFIX)
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(GalleryError::Validation(format!(
            "Id must look like {}<digits>, got {:?}",
            ID_PREFIX, id
        )))
    }
}

/// 列表条目 + 详情页 → 详情记录
fn build_detail(mut entry: GalleryEntry, page: GalleryPage) -> ActressDetail {
    if let Some(name) = page
        .heading
        .as_deref()
        .map(display_name)
        .filter(|name| !name.is_empty())
    {
        entry.name = name;
    }
    entry.height = page.height.or(entry.height);
    entry.birth_date = page.birth_date.or(entry.birth_date);

    let bio = page
        .bio
        .unwrap_or_else(|| format!("{} is an Indian actress.", entry.name));

    ActressDetail {
        entry,
        images: page.images,
        albums: page.albums,
        bio,
        known_for: Vec::new(),
        social_media: HashMap::new(),
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CacheConfig;
    use crate::core::error::{ErrorKind, FetchCause};
    use crate::engine::fixtures::{FakeSource, album_page, listing_page, teaser};
    use rstest::rstest;

    const LATEST: &str = "https://www.ragalahari.com/actress/starzone.aspx";
    const LETTER_S: &str = "https://www.ragalahari.com/actress/s/starzonesearch.aspx";
    const ALBUM: &str = "https://www.ragalahari.com/actress/7/sam.aspx";
    const ALBUM_2: &str = "https://www.ragalahari.com/actress/7/sam-2.aspx";

    fn gallery_html(id: u32) -> String {
        format!(
            r#"<html><body>
                 <h1>Actress Samantha at Event</h1>
                 <img src="https://starzone.ragalahari.com/a/{id}/s1t.jpg">
                 <a class="galleryname" href="/actress/{id}0/album-one.aspx">Album One Stills</a>
               </body></html>"#
        )
    }

    fn service(source: FakeSource) -> (GalleryService, Arc<FakeSource>) {
        let source = Arc::new(source);
        let service = GalleryService::with_source(AppConfig::default(), source.clone()).unwrap();
        (service, source)
    }

    fn listings_source() -> FakeSource {
        FakeSource::new()
            .page(LATEST, listing_page(&[(1, "Samantha"), (2, "Priya")]))
            .page(LETTER_S, listing_page(&[(3, "Samuel"), (1, "Samantha"), (4, "Sneha")]))
            .page("https://www.ragalahari.com/actress/1/g-1.aspx", gallery_html(1))
            .page("https://www.ragalahari.com/actress/3/g-3.aspx", gallery_html(3))
    }

    #[tokio::test]
    async fn test_latest_is_capped_and_cached() {
        let body: String = (1..=30).map(|i| teaser(i, &format!("Name{}", i))).collect();
        let (service, source) = service(FakeSource::new().page(LATEST, format!("<html><body>{}</body></html>", body)));

        let first = service.latest().await.unwrap();
        let second = service.latest().await.unwrap();

        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_latest_unreachable_is_typed_error() {
        let (service, _) = service(FakeSource::new().failing(LATEST, FetchCause::Timeout));

        let err = service.latest().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(err.status(), http::StatusCode::BAD_GATEWAY);
    }

    #[rstest]
    #[case("q")]
    #[case("Q")]
    #[case("1")]
    #[case("ab")]
    #[case("")]
    #[case("é")]
    #[tokio::test]
    async fn test_invalid_letter_never_reaches_network(#[case] letter: &str) {
        let (service, source) = service(listings_source());

        let err = service.browse_by_letter(letter).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_letter_is_case_insensitive() {
        let (service, source) = service(listings_source());

        let entries = service.browse_by_letter("S").await.unwrap();
        service.browse_by_letter("s").await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(source.calls(), vec![LETTER_S]);
    }

    #[tokio::test]
    async fn test_search_over_cached_listings() {
        let (service, source) = service(listings_source());
        service.latest().await.unwrap();
        service.browse_by_letter("s").await.unwrap();
        let fetched = source.call_count();

        let hits = service.search("  sam ", 10).await.unwrap();
        let names: Vec<_> = hits.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, ["Samantha", "Samuel"]);
        assert_eq!(source.call_count(), fetched);
        assert_eq!(service.search("SAM", 1).await.unwrap().len(), 1);
        assert!(service.search("zz", 10).await.unwrap().is_empty());
    }

    #[rstest]
    #[case("s", 10)]
    #[case("   ", 10)]
    #[case("sam", 0)]
    #[case("sam", 101)]
    #[tokio::test]
    async fn test_search_validation(#[case] query: &str, #[case] limit: usize) {
        let (service, _) = service(listings_source());
        let err = service.search(query, limit).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_detail_images_only_for_latest_entries() {
        let (service, _) = service(listings_source());
        service.latest().await.unwrap();
        service.browse_by_letter("s").await.unwrap();

        let from_latest = service.actress_detail("rh_1").await.unwrap();
        let from_letter = service.actress_detail("rh_3").await.unwrap();

        assert_eq!(
            from_latest.images,
            vec!["https://starzone.ragalahari.com/a/1/s1.jpg"]
        );
        assert!(from_letter.images.is_empty());
        assert_eq!(from_letter.albums.len(), 1);
        assert_eq!(from_latest.entry.name, "Samantha");
        assert_eq!(from_latest.bio, "Samantha is an Indian actress.");
    }

    #[tokio::test]
    async fn test_detail_is_cached() {
        let (service, source) = service(listings_source());
        service.latest().await.unwrap();

        service.actress_detail("rh_1").await.unwrap();
        let albums = service.actress_albums("rh_1").await.unwrap();

        assert_eq!(albums[0].name, "Album One Stills");
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_without_network() {
        let (service, source) = service(listings_source());

        let err = service.actress_detail("rh_1").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_origin_404_is_not_found() {
        let (service, _) = service(listings_source());
        service.latest().await.unwrap();

        // rh_2 的详情页未预置，来源返回 404
        let err = service.actress_detail("rh_2").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[rstest]
    #[case("1")]
    #[case("rh_")]
    #[case("rh_12a")]
    #[case("RH_12")]
    #[tokio::test]
    async fn test_malformed_id_is_validation_error(#[case] id: &str) {
        let (service, source) = service(listings_source());
        let err = service.actress_detail(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(source.call_count(), 0);
    }

    #[rstest]
    #[case("not a url")]
    #[case("https://example.com/actress/7/sam.aspx")]
    #[case("ftp://www.ragalahari.com/actress/7/sam.aspx")]
    #[tokio::test]
    async fn test_album_url_validation(#[case] url: &str) {
        let (service, source) = service(FakeSource::new());
        let err = service.album_photos(url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_complete_album_is_cached() {
        let (service, source) = service(
            FakeSource::new()
                .page(ALBUM, album_page(7, 1, 3, Some("sam-2.aspx")))
                .page(ALBUM_2, album_page(7, 2, 2, None)),
        );

        let first = service.album_photos(ALBUM).await.unwrap();
        let second = service.album_photos(ALBUM).await.unwrap();

        assert!(first.complete);
        assert_eq!(first.photos.len(), 5);
        assert_eq!(first, second);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_partial_album_is_not_cached() {
        let (service, source) = service(
            FakeSource::new()
                .page(ALBUM, album_page(7, 1, 3, Some("sam-2.aspx")))
                .failing(ALBUM_2, FetchCause::Status(http::StatusCode::SERVICE_UNAVAILABLE)),
        );

        let first = service.album_photos(ALBUM).await.unwrap();
        service.album_photos(ALBUM).await.unwrap();

        assert!(!first.complete);
        assert_eq!(first.photos.len(), 3);
        assert_eq!(source.call_count(), 4);
    }

    #[tokio::test]
    async fn test_disabled_cache_refetches() {
        let source = Arc::new(listings_source());
        let config = AppConfig::builder()
            .cache(CacheConfig::builder().enabled(false).build())
            .build();
        let service = GalleryService::with_source(config, source.clone()).unwrap();

        service.latest().await.unwrap();
        service.latest().await.unwrap();

        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_still_resolves_observed_entries() {
        let source = Arc::new(listings_source());
        let config = AppConfig::builder()
            .cache(CacheConfig::builder().enabled(false).build())
            .build();
        let service = GalleryService::with_source(config, source.clone()).unwrap();
        service.latest().await.unwrap();

        let detail = service.actress_detail("rh_1").await.unwrap();
        let hits = service.search("sam", 10).await.unwrap();
        service.actress_detail("rh_1").await.unwrap();

        assert_eq!(detail.images.len(), 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "rh_1");
        // 详情不走缓存，每次都重新抓取
        assert_eq!(source.call_count(), 3);
    }
}
