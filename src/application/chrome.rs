use crate::application::metadata::{SeoFields, SiteIdentity, page_meta};
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView,
};

const NAVIGATION: [(&str, &str); 5] = [
    ("Home", "/"),
    ("Articles", "/articles"),
    ("Authors", "/authors"),
    ("Categories", "/categories"),
    ("Search", "/search"),
];

/// Header, navigation and footer shared by every page. The navigation is
/// fixed; metadata comes from the site identity.
#[derive(Clone)]
pub struct ChromeService {
    site: SiteIdentity,
}

impl ChromeService {
    pub fn new(site: SiteIdentity) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &SiteIdentity {
        &self.site
    }

    pub fn load(&self) -> LayoutChrome {
        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries: NAVIGATION
                    .iter()
                    .map(|(label, href)| NavigationLinkView {
                        label: (*label).to_string(),
                        href: (*href).to_string(),
                    })
                    .collect(),
            },
            footer: FooterView {
                copy: format!("© {}", self.site.title),
            },
            meta: page_meta(&self.site, &SeoFields::default(), "/"),
        }
    }

    pub fn for_page(&self, seo: &SeoFields, path: &str) -> LayoutChrome {
        self.load().with_meta(page_meta(&self.site, seo, path))
    }
}
