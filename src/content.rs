//! Typed view of the site content documents (`json/app.json`,
//! `json/blog.json`). Only what the templates read is modeled;
//! unknown fields are ignored, most fields default when missing.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Deserialize;

// ------------------------------------------------------------------
// app.json

#[derive(Debug, Clone, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub design: Design,
    pub global_components: GlobalComponents,
    #[serde(default)]
    pub pages: Pages,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Design {
    #[serde(default)]
    pub colors: Colors,
    pub fonts: Option<Fonts>,
}

/// `variables` maps CSS custom property names to values; all other
/// entries that are strings are color names to values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Colors {
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl Colors {
    pub fn named_colors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.other.iter().filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fonts {
    #[serde(default)]
    pub primary: String,
    #[serde(default)]
    pub secondary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalComponents {
    pub header: Header,
    pub footer: Footer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub logo: Option<String>,
    #[serde(default)]
    pub menu: Vec<Link>,
    #[serde(default)]
    pub cta_enabled: bool,
    #[serde(default)]
    pub cta_url: String,
    #[serde(default)]
    pub cta_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Footer {
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub quick_links: Vec<Link>,
    #[serde(default)]
    pub company_links: Vec<Link>,
    #[serde(default)]
    pub newsletter: Newsletter,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub social: Vec<SocialIcon>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Newsletter {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub button_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialIcon {
    pub url: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pages {
    pub home: Option<HomePage>,
    pub services: Option<ServicesPage>,
    pub portfolio: Option<PortfolioPage>,
    pub about: Option<AboutPage>,
    pub blog: Option<BlogPage>,
    pub contact: Option<ContactPage>,
}

/// Icon + title + description, used by features, service overview
/// items and values.
#[derive(Debug, Clone, Deserialize)]
pub struct IconCard {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hero {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub button_text: String,
}

// Home

#[derive(Debug, Clone, Deserialize)]
pub struct HomePage {
    #[serde(default)]
    pub hero: Hero,
    #[serde(default)]
    pub sections: HomeSections,
    #[serde(default)]
    pub cta: Cta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeSections {
    #[serde(default)]
    pub features: Vec<IconCard>,
    #[serde(default)]
    pub services_overview: ServicesOverview,
    #[serde(default)]
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesOverview {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub items: Vec<IconCard>,
}

/// Numbers or strings are both accepted in the document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(serde_json::Number),
    Text(String),
}

impl Default for StatValue {
    fn default() -> Self {
        StatValue::Number(0.into())
    }
}

impl Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatValue::Number(n) => write!(f, "{n}"),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub clients: StatValue,
    #[serde(default)]
    pub projects: StatValue,
    #[serde(default)]
    pub countries: StatValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cta {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub button_text: String,
}

// Services

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesPage {
    #[serde(default)]
    pub categories: Vec<ServiceCategory>,
    #[serde(default)]
    pub process: Process,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCategory {
    pub name: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub steps: Vec<ProcessStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessStep {
    pub number: StatValue,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

// Portfolio

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioPage {
    #[serde(default)]
    pub categories: Vec<ProjectCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCategory {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: String,
}

/// A project together with the name of the category it's listed in.
#[derive(Debug, Clone, Copy)]
pub struct CategorizedProject<'t> {
    pub category: &'t str,
    pub project: &'t Project,
}

impl PortfolioPage {
    pub fn all_projects(&self) -> impl Iterator<Item = CategorizedProject<'_>> {
        self.categories.iter().flat_map(
            |cat| cat.projects.iter().map(
                move |project| CategorizedProject { category: &cat.name, project }))
    }
}

// About

#[derive(Debug, Clone, Deserialize)]
pub struct AboutPage {
    #[serde(default)]
    pub hero: Hero,
    #[serde(default)]
    pub intro: Intro,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub values: Vec<IconCard>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub process: Process,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Intro {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
}

// Blog (listing page in app.json)

#[derive(Debug, Clone, Deserialize)]
pub struct BlogPage {
    #[serde(default)]
    pub posts: Vec<BlogTeaser>,
    #[serde(default)]
    pub sidebar: BlogSidebar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogTeaser {
    pub title: String,
    pub link: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub excerpt: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogSidebar {
    #[serde(default, rename = "popularPosts")]
    pub popular_posts: Vec<PopularPost>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopularPost {
    pub title: String,
    pub link: Option<String>,
}

// Contact

#[derive(Debug, Clone, Deserialize)]
pub struct ContactPage {
    pub form: ContactFormSpec,
    #[serde(default)]
    pub info: ContactInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactFormSpec {
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub button: FormButton,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
}

fn default_field_type() -> String {
    "text".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormButton {
    pub text: String,
}

impl Default for FormButton {
    fn default() -> Self {
        FormButton { text: "Send".into() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub contact: ContactDetails,
    /// platform name -> URL
    pub social: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl AppData {
    /// All portfolio projects across categories, in document order.
    pub fn all_projects(&self) -> Vec<CategorizedProject<'_>> {
        match &self.pages.portfolio {
            Some(p) => p.all_projects().collect(),
            None => Vec::new(),
        }
    }

    /// The titles of all services across categories, in document
    /// order.
    pub fn all_service_titles(&self) -> Vec<&str> {
        match &self.pages.services {
            Some(s) => s.categories.iter()
                .flat_map(|cat| cat.services.iter().map(|svc| svc.title.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }
}

// ------------------------------------------------------------------
// blog.json

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogData {
    #[serde(default)]
    pub posts: Vec<BlogPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "readTime")]
    pub read_time: String,
    pub author: Option<Author>,
    /// Markdown.
    #[serde(default)]
    pub content: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
}

impl BlogData {
    pub fn post(&self, id: &str) -> Option<&BlogPost> {
        self.posts.iter().find(|p| p.id == id)
    }
}

/// The post id a listing link points to: its last `/` segment.
pub fn post_id_from_link(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_app() -> AppData {
        serde_json::from_value(json!({
            "design": {
                "colors": {
                    "variables": { "--primary": "#0891b2" },
                    "primary": "#0891b2",
                    "shades": [1, 2]
                },
                "fonts": { "primary": "Inter", "secondary": "Roboto" }
            },
            "global_components": {
                "header": { "menu": [{ "label": "Home", "url": "/" }],
                            "cta_enabled": true, "cta_url": "/contact",
                            "cta_text": "Get a quote" },
                "footer": { "tagline": "We build", "copyright": "(c) FTTG" }
            },
            "pages": {
                "home": { "sections": { "stats": { "clients": 50, "projects": "120",
                                                   "countries": 3.5 } } },
                "services": { "categories": [
                    { "name": "Web", "services": [{ "title": "Websites" },
                                                  { "title": "Shops" }] },
                    { "name": "Apps", "services": [{ "title": "Mobile Apps" }] }
                ] },
                "portfolio": { "categories": [
                    { "name": "Web", "projects": [{ "title": "A" }, { "title": "B" }] },
                    { "name": "Mobile", "projects": [{ "title": "C" }] }
                ] },
                "unknown_page": { "x": 1 }
            }
        })).unwrap()
    }

    #[test]
    fn t_parse_and_flatten() {
        let app = sample_app();
        assert_eq!(app.all_service_titles(), vec!["Websites", "Shops", "Mobile Apps"]);
        let projects: Vec<_> = app.all_projects().iter()
            .map(|p| (p.category, p.project.title.as_str())).collect();
        assert_eq!(projects, vec![("Web", "A"), ("Web", "B"), ("Mobile", "C")]);
        assert!(app.pages.about.is_none());
        assert!(app.pages.contact.is_none());
    }

    #[test]
    fn t_stat_values() {
        let app = sample_app();
        let stats = &app.pages.home.as_ref().unwrap().sections.stats;
        assert_eq!(stats.clients.to_string(), "50");
        assert_eq!(stats.projects.to_string(), "120");
        assert_eq!(stats.countries.to_string(), "3.5");
    }

    #[test]
    fn t_colors() {
        let app = sample_app();
        let colors = &app.design.colors;
        assert_eq!(colors.variables.as_ref().unwrap().get("--primary").map(|s| s.as_str()),
                   Some("#0891b2"));
        let named: Vec<_> = colors.named_colors().collect();
        assert_eq!(named, vec![("primary", "#0891b2")]);
    }

    #[test]
    fn t_blog() -> serde_json::Result<()> {
        let blog: BlogData = serde_json::from_str(r#"{"posts": [
            {"id": "rust-web", "title": "Rust on the web", "readTime": "5 min",
             "content": "Hello", "author": {"name": "Ann"}}
        ]}"#)?;
        let post = blog.post("rust-web").unwrap();
        assert_eq!(post.read_time, "5 min");
        assert_eq!(post.author.as_ref().unwrap().name, "Ann");
        assert!(post.tags.is_none());
        assert!(blog.post("nope").is_none());
        assert!(serde_json::from_str::<BlogData>("{").is_err());
        Ok(())
    }

    #[test]
    fn t_post_id_from_link() {
        assert_eq!(post_id_from_link("/blog/rust-web"), "rust-web");
        assert_eq!(post_id_from_link("rust-web"), "rust-web");
        assert_eq!(post_id_from_link("/blog/"), "");
    }
}
