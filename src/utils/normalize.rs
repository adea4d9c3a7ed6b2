//! URL 规范化 (URL Normalizer)
//!
//! 纯函数集合：相对地址补全、缩略图→原图改写、广告/站标过滤与 ID 推导。

use url::Url;

/// 广告网络特征
const AD_PATTERNS: &[&str] = &[
    "taboola",
    "googlesyndication",
    "doubleclick",
    "adservice",
    "outbrain",
    "/ads/",
];

/// 站点装饰图特征
const CHROME_PATTERNS: &[&str] = &["logo", "banner", "icon"];

/// 将 `href` 补全为绝对地址
pub fn resolve(base: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }

    if let Some(rest) = href.strip_prefix("//") {
        return format!("{}://{}", base.scheme(), rest);
    }

    if is_absolute(href) {
        return href.to_string();
    }

    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn is_absolute(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// 拆分出文件名所在的路径部分与查询/片段尾部
fn split_tail(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    }
}

/// 跳过 `scheme://authority` 后路径部分的起始偏移，没有路径时为 `None`
fn path_offset(url: &str) -> Option<usize> {
    let authority = url
        .find("://")
        .map(|i| i + 3)
        .or_else(|| url.starts_with("//").then_some(2));
    match authority {
        Some(at) => url[at..].find('/').map(|i| at + i),
        None => Some(0),
    }
}

/// 最后一个路径段的 (起始偏移, 主名, 扩展名)
fn last_segment(path: &str) -> Option<(usize, &str, &str)> {
    let offset = path_offset(path)?;
    let start = path[offset..]
        .rfind('/')
        .map(|i| offset + i + 1)
        .unwrap_or(offset);
    let segment = &path[start..];
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((start, stem, ext))
}

/// 缩略图→原图 (HD upgrade)
///
/// `.../1t.jpg` → `.../1.jpg`。纯文本替换，不校验原图是否真实存在。
pub fn to_hd(url: &str) -> String {
    let (path, tail) = split_tail(url);
    let Some((start, stem, ext)) = last_segment(path) else {
        return url.to_string();
    };

    match stem.strip_suffix('t') {
        Some(hd_stem) if !hd_stem.is_empty() => {
            format!("{}{}.{}{}", &path[..start], hd_stem, ext, tail)
        }
        _ => url.to_string(),
    }
}

/// 图集封面 (`thumb.<ext>`)，不属于相册内的单张照片
pub fn is_cover_thumb(url: &str) -> bool {
    let (path, _) = split_tail(url);
    last_segment(path)
        .map(|(_, stem, _)| stem.to_ascii_lowercase().ends_with("thumb"))
        .unwrap_or(false)
}

/// 封面 `…thumb.<ext>` 推测为相册第一张 `…1.<ext>`
pub fn cover_to_first_photo(url: &str) -> String {
    let (path, tail) = split_tail(url);
    match last_segment(path) {
        Some((start, stem, ext)) if stem.ends_with("thumb") => {
            let prefix = &stem[..stem.len() - "thumb".len()];
            format!("{}{}1.{}{}", &path[..start], prefix, ext, tail)
        }
        _ => url.to_string(),
    }
}

/// 广告或站点装饰图
pub fn is_filtered(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    AD_PATTERNS
        .iter()
        .chain(CHROME_PATTERNS)
        .any(|p| lower.contains(p))
}

/// 由 URL 中首个纯数字路径段推导条目 ID
///
/// 假设该数字段在整个源站内唯一。
pub fn derive_id(href: &str) -> Option<String> {
    let path = match Url::parse(href) {
        Ok(u) => u.path().to_string(),
        Err(_) => split_tail(href).0.to_string(),
    };

    path.split('/')
        .find(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
        .map(|n| format!("rh_{}", n))
}

/// `srcset` 类属性中第一个候选地址
pub fn first_srcset_candidate(attr: &str) -> Option<&str> {
    attr.split(',')
        .next()
        .and_then(|c| c.split_whitespace().next())
        .filter(|s| !s.is_empty())
}

/// 主机是否属于给定列表 (含子域)
pub fn host_matches(url: &str, hosts: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    hosts
        .iter()
        .any(|h| host.eq_ignore_ascii_case(h) || host.ends_with(&format!(".{}", h)))
}

/// 图集标题 → 人名
///
/// "Actress Name at Event" / "Name in Saree, Stills" → "Name"
pub fn display_name(title: &str) -> String {
    let head = title
        .split(" at ")
        .next()
        .and_then(|s| s.split(" in ").next())
        .and_then(|s| s.split(',').next())
        .unwrap_or_default();

    head.replace("Actress ", "")
        .replace("Heroine ", "")
        .replace("Model ", "")
        .trim()
        .to_string()
}

/// `/actress/1/my-album-name.aspx` → "My Album Name"
pub fn title_from_slug(href: &str) -> String {
    let (path, _) = split_tail(href);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let slug = segment.strip_suffix(".aspx").unwrap_or(segment);

    slug.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
