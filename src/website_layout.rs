use anyhow::Result;

use crate::ahtml::{Html, Node, att};
use crate::content_store::Content;
use crate::render::{RenderedPage, css_variables, render_footer, render_header};
use crate::route::LinkStyle;
use crate::webparts::LayoutInterface;

pub const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
pub const BOOTSTRAP_ICONS_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css";

pub struct WebsiteLayout {
    pub site_name: &'static str,
    /// Site specific stylesheet, under the static files path.
    pub stylesheet: &'static str,
}

impl Default for WebsiteLayout {
    fn default() -> Self {
        WebsiteLayout {
            site_name: "FTTG Solutions",
            stylesheet: "/static/site.css",
        }
    }
}

impl LayoutInterface for WebsiteLayout {
    fn page(
        &self,
        html: &Html,
        content: &Content,
        links: LinkStyle,
        page: RenderedPage,
    ) -> Result<Node>
    {
        let components = &content.app.global_components;
        html.html(
            [att("lang", "en")],
            [
                html.head(
                    [],
                    [
                        html.meta([att("charset", "utf-8")], [])?,
                        html.meta([att("name", "viewport"),
                                   att("content", "width=device-width, initial-scale=1.0")],
                                  [])?,
                        html.title([], [html.string(format!("{} | {}",
                                                            page.title, self.site_name))?])?,
                        html.script([att("src", TAILWIND_CDN)], [])?,
                        html.link([att("rel", "stylesheet"),
                                   att("href", BOOTSTRAP_ICONS_CSS)], [])?,
                        html.link([att("rel", "stylesheet"),
                                   att("href", self.stylesheet)], [])?,
                        // Filtered in css_variables
                        html.style([], [html.preserialized(css_variables(&content.app.design))?])?,
                    ])?,
                html.body(
                    [],
                    [
                        html.div(
                            [att("id", "app")],
                            [
                                render_header(html, &components.header, links)?,
                                html.main([att("class", "main-content")], [page.main])?,
                                render_footer(html, &components.footer, links)?,
                            ])?
                    ])?
            ])
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ahtml::to_html_string;
    use crate::content::{AppData, BlogData};
    use crate::render::FormView;
    use crate::route::Route;
    use crate::render::render_page;

    #[test]
    fn t_page() -> Result<()> {
        let app: AppData = serde_json::from_value(serde_json::json!({
            "design": {"colors": {"variables": {"--primary": "#0891b2"}}},
            "global_components": {
                "header": {"menu": [{"label": "Home", "url": "/"}]},
                "footer": {"copyright": "© FTTG"}
            }
        }))?;
        let content = Content::from_parts(app, BlogData::default());
        let html = Html;
        let page = render_page(&html, &Route::from_path("/services"), &content,
                               LinkStyle::Path, &FormView::default())?;
        let s = to_html_string(
            &WebsiteLayout::default().page(&html, &content, LinkStyle::Path, page)?, true);
        assert!(s.starts_with("<!DOCTYPE html>\n<html lang=\"en\"><head>"));
        assert!(s.contains("<title>Page not found | FTTG Solutions</title>"));
        assert!(s.contains("<style>:root {\n  --primary: #0891b2;\n}</style>"));
        assert!(s.contains("<div id=\"app\"><header"));
        assert!(s.contains("<main class=\"main-content\"><div class=\"not-found"));
        assert!(s.contains("© FTTG"));
        Ok(())
    }
}
