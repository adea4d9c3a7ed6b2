use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 数据来源标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScraperSource {
    #[default]
    Ragalahari,
}

/// 列表条目对应的链接形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// `/actress/<id>/<slug>.aspx`
    #[default]
    Gallery,
    /// `/stars/profile/<id>/<slug>.aspx`
    Profile,
}

/// 列表页中的单个图集条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// `rh_<numeric>`
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    /// 条目所指向的图集/资料页
    pub url: String,
    #[serde(default)]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default = "default_nationality")]
    pub nationality: String,
    #[serde(default = "default_profession")]
    pub profession: String,
    #[serde(default)]
    pub source: ScraperSource,
}

pub fn default_nationality() -> String {
    "Indian".to_string()
}

pub fn default_profession() -> String {
    "Actress".to_string()
}

impl GalleryEntry {
    pub fn new(id: String, name: String, thumbnail: String, url: String, kind: EntryKind) -> Self {
        Self {
            id,
            name,
            thumbnail,
            url,
            kind,
            age: None,
            birth_date: None,
            height: None,
            nationality: default_nationality(),
            profession: default_profession(),
            source: ScraperSource::Ragalahari,
        }
    }
}

/// 相册
///
/// `url` 是相册在源站内的唯一标识，相同 `url` 视为同一相册。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl PartialEq for Album {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Album {}

impl std::hash::Hash for Album {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// 图集详情
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActressDetail {
    #[serde(flatten)]
    pub entry: GalleryEntry,
    /// 仅在最新图集模式下填充
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub albums: Vec<Album>,
    pub bio: String,
    #[serde(default)]
    pub known_for: Vec<String>,
    #[serde(default)]
    pub social_media: HashMap<String, String>,
    pub last_updated: DateTime<Utc>,
}

/// 单个相册的原图序列 (按分页访问顺序拼接)
pub type PhotoList = Vec<String>;
