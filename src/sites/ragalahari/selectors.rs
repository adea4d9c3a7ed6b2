//! Ragalahari 选择器
//!
//! 预编译的 CSS 选择器

use std::sync::OnceLock;

use scraper::Selector;

/// 站点选择器集合
pub(crate) struct SiteSelectors {
    pub body: Selector,
    pub galleries_section: Selector,
    pub gal_img: Selector,
    pub gallery_name: Selector,
    pub img: Selector,
    pub heading: Selector,
    pub bio_container: Selector,
    pub paragraph: Selector,
    pub pagination_next: Selector,
}

static SELECTORS: OnceLock<SiteSelectors> = OnceLock::new();

impl SiteSelectors {
    /// 获取全局选择器实例
    pub fn get() -> &'static SiteSelectors {
        SELECTORS.get_or_init(|| SiteSelectors {
            body: Selector::parse("body").unwrap(),
            galleries_section: Selector::parse("div#galleries").unwrap(),
            gal_img: Selector::parse("a.galimg[href]").unwrap(),
            gallery_name: Selector::parse("a.galleryname[href]").unwrap(),
            img: Selector::parse("img").unwrap(),
            heading: Selector::parse("h1").unwrap(),
            bio_container: Selector::parse("div#bio, section.biography").unwrap(),
            paragraph: Selector::parse("p").unwrap(),
            pagination_next: Selector::parse(
                "a[rel='next'][href], a.next[href], a#lnkNext[href], ul.pagination li.active + li a[href]",
            )
            .unwrap(),
        })
    }
}
