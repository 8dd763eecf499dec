//! Mapping locations to pages, and emitting links in either of the
//! two supported styles.

use std::borrow::Cow;
use std::fmt::Display;

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Services,
    Portfolio,
    About,
    Blog,
    Contact,
}

impl Page {
    pub const ALL: [Page; 6] = [Page::Home, Page::Services, Page::Portfolio,
                                Page::About, Page::Blog, Page::Contact];

    pub fn from_name(s: &str) -> Option<Page> {
        match s {
            "home" => Some(Page::Home),
            "services" => Some(Page::Services),
            "portfolio" => Some(Page::Portfolio),
            "about" => Some(Page::About),
            "blog" => Some(Page::Blog),
            "contact" => Some(Page::Contact),
            _ => None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Services => "services",
            Page::Portfolio => "portfolio",
            Page::About => "about",
            Page::Blog => "blog",
            Page::Contact => "contact",
        }
    }

    /// Used in the document title.
    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Services => "Services",
            Page::Portfolio => "Portfolio",
            Page::About => "About",
            Page::Blog => "Blog",
            Page::Contact => "Contact",
        }
    }

    /// Clean URL path of the page.
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Services => "/services",
            Page::Portfolio => "/portfolio",
            Page::About => "/about",
            Page::Blog => "/blog",
            Page::Contact => "/contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Page(Page),
    BlogPost(String),
    NotFound(String),
}

impl Route {
    fn from_name(name: &str) -> Route {
        if name.is_empty() {
            return Route::Page(Page::Home)
        }
        if let Some(page) = Page::from_name(name) {
            return Route::Page(page)
        }
        if let Some(id) = name.strip_prefix("blog/") {
            if !id.is_empty() && !id.contains('/') {
                return Route::BlogPost(id.into())
            }
        }
        Route::NotFound(name.into())
    }

    /// From a hash fragment like `#services` (the `#` is optional).
    pub fn from_fragment(fragment: &str) -> Route {
        Route::from_name(fragment.strip_prefix('#').unwrap_or(fragment))
    }

    /// From a clean URL path like `/services/`.
    pub fn from_path(path: &str) -> Route {
        Route::from_name(path.trim_matches('/'))
    }

    /// The page name as used in "Page not found" reporting and
    /// document titles.
    pub fn title(&self) -> Cow<'static, str> {
        match self {
            Route::Page(p) => Cow::Borrowed(p.title()),
            Route::BlogPost(_) => Cow::Borrowed("Blog"),
            Route::NotFound(_) => Cow::Borrowed("Page not found"),
        }
    }
}

/// `/` stays, anything else gets exactly one leading slash.
pub fn normalize_nav_path(path: &str) -> String {
    if path == "/" {
        path.into()
    } else {
        format!("/{}", path.trim_start_matches('/'))
    }
}

/// How navigation URLs from the content document are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// `#home`, `#services`: the location fragment selects the page.
    Hash,
    /// Clean URLs, emitted as given.
    Path,
}

impl Default for LinkStyle {
    fn default() -> Self { LinkStyle::Path }
}

impl LinkStyle {
    pub fn from_str(s: &str) -> Result<LinkStyle> {
        match s {
            "hash" => Ok(LinkStyle::Hash),
            "path" => Ok(LinkStyle::Path),
            _ => bail!("invalid link style {s:?}, expecting \"hash\" or \"path\"")
        }
    }

    /// Map a URL from the content document to the link to emit.
    /// External URLs (with a scheme, or `mailto:` etc.) and plain
    /// fragments are left alone in both styles.
    pub fn href<'s>(self, url: &'s str) -> Cow<'s, str> {
        match self {
            LinkStyle::Path => {
                if url.starts_with('#') || url.contains(':') {
                    return Cow::Borrowed(url)
                }
                let normalized = normalize_nav_path(url);
                if normalized == url {
                    Cow::Borrowed(url)
                } else {
                    Cow::Owned(normalized)
                }
            }
            LinkStyle::Hash => {
                if url == "/" {
                    Cow::Borrowed("#home")
                } else if url.starts_with('#') || url.contains(':') {
                    Cow::Borrowed(url)
                } else {
                    Cow::Owned(format!("#{}", url.replacen('/', "", 1)))
                }
            }
        }
    }

    /// Link to a page.
    pub fn page_href(self, page: Page) -> Cow<'static, str> {
        self.href(page.path()).into_owned().into()
    }

    /// Link to a single blog post. Posts are separate documents in
    /// both styles.
    pub fn post_href(self, id: &str) -> String {
        format!("/blog/{id}")
    }
}

impl Display for LinkStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LinkStyle::Hash => "hash",
            LinkStyle::Path => "path",
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_from_fragment() {
        assert_eq!(Route::from_fragment(""), Route::Page(Page::Home));
        assert_eq!(Route::from_fragment("#"), Route::Page(Page::Home));
        assert_eq!(Route::from_fragment("#services"), Route::Page(Page::Services));
        assert_eq!(Route::from_fragment("#contact"), Route::Page(Page::Contact));
        assert_eq!(Route::from_fragment("#pricing"), Route::NotFound("pricing".into()));
    }

    #[test]
    fn t_from_path() {
        assert_eq!(Route::from_path("/"), Route::Page(Page::Home));
        assert_eq!(Route::from_path(""), Route::Page(Page::Home));
        assert_eq!(Route::from_path("/home"), Route::Page(Page::Home));
        assert_eq!(Route::from_path("/services/"), Route::Page(Page::Services));
        assert_eq!(Route::from_path("/blog"), Route::Page(Page::Blog));
        assert_eq!(Route::from_path("/blog/rust-web"), Route::BlogPost("rust-web".into()));
        assert_eq!(Route::from_path("/blog/a/b"), Route::NotFound("blog/a/b".into()));
        assert_eq!(Route::from_path("/nope"), Route::NotFound("nope".into()));
    }

    #[test]
    fn t_all_pages_roundtrip_names() {
        for page in Page::ALL {
            assert_eq!(Route::from_path(page.path()), Route::Page(page));
            assert_eq!(Route::from_fragment(&format!("#{}", page.name())), Route::Page(page));
        }
    }

    #[test]
    fn t_normalize_nav_path() {
        assert_eq!(normalize_nav_path("/"), "/");
        assert_eq!(normalize_nav_path("services"), "/services");
        assert_eq!(normalize_nav_path("/services"), "/services");
        assert_eq!(normalize_nav_path("//services"), "/services");
    }

    #[test]
    fn t_link_style() -> Result<()> {
        let hash = LinkStyle::from_str("hash")?;
        assert_eq!(hash.href("/"), "#home");
        assert_eq!(hash.href("/services"), "#services");
        assert_eq!(hash.href("contact"), "#contact");
        assert_eq!(hash.href("https://example.com/x"), "https://example.com/x");
        assert_eq!(hash.href("#about"), "#about");
        assert_eq!(hash.page_href(Page::Portfolio), "#portfolio");
        let path = LinkStyle::from_str("path")?;
        assert_eq!(path.href("/services"), "/services");
        assert_eq!(path.href("services"), "/services");
        assert_eq!(path.href("//contact"), "/contact");
        assert_eq!(path.href("mailto:dev@fttgsolutions.com"), "mailto:dev@fttgsolutions.com");
        assert_eq!(path.href("#top"), "#top");
        assert_eq!(path.page_href(Page::Home), "/");
        assert!(LinkStyle::from_str("other").is_err());
        Ok(())
    }
}
