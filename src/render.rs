//! Page templates: pure functions from content fragments to markup.
//! All content strings are emitted as escaped text; the only
//! preserialized HTML is the output of the markdown renderer and the
//! design CSS block, both filtered before use.

use std::borrow::Cow;

use anyhow::Result;
use itertools::Itertools;
use kstring::KString;
use pulldown_cmark::{Event, Options, Parser, html::push_html};

use crate::ahtml::{Html, Node, TryCollectBody, att, flag_att, opt_att};
use crate::content::{AboutPage, AppData, BlogPage, BlogPost, ContactPage, Design, Footer,
                     Header, HomePage, Link, PortfolioPage, Process, ServicesPage,
                     post_id_from_link};
use crate::content_store::Content;
use crate::form::{ContactForm, CUSTOM_SUBJECT};
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::route::{LinkStyle, Page, Route};
use crate::warn;

fn class(s: &'static str) -> Option<(KString, KString)> {
    att("class", s)
}

const INPUT_CLASS: &str = "w-full px-4 py-3 border border-gray-300 rounded-lg focus:outline-none \
                           focus:border-blue-600 focus:ring-2 focus:ring-blue-100";

// ------------------------------------------------------------------
// Header and footer

fn nav_links(html: &Html, menu: &[Link], links: LinkStyle, link_class: &'static str)
             -> Result<Vec<Node>>
{
    menu.iter().map(|item| {
        html.a([att("href", links.href(&item.url).as_ref()), class(link_class)],
               [html.string(&item.label)?])
    }).try_collect_body()
}

pub fn render_header(html: &Html, header: &Header, links: LinkStyle) -> Result<Node> {
    let logo = match &header.logo {
        Some(logo) => vec![
            html.img([att("src", logo), att("alt", "Logo"), class("h-14")], [])?,
            html.span([class("text-white font-bold text-lg hidden")],
                      [html.staticstr("FTTG Solutions")?])?,
        ],
        None => vec![
            html.span([class("text-white font-bold text-lg")],
                      [html.staticstr("FTTG Solutions")?])?,
        ],
    };
    let cta = if header.cta_enabled {
        html.a([att("href", links.href(&header.cta_url).as_ref()),
                class("hidden md:inline-block bg-cyan-400 hover:bg-cyan-500 text-white px-6 \
                       py-2 rounded font-semibold transition-all")],
               [html.string(&header.cta_text)?])?
    } else {
        html.empty_node()?
    };
    let bar = || html.span([class("w-6 h-0.5 bg-white rounded transition-all duration-300 \
                                   origin-center")], []);
    html.header(
        [class("bg-gradient-to-r from-blue-600 to-cyan-400 text-white sticky top-0 z-50 \
                shadow-lg relative")],
        [
            html.div(
                [class("max-w-6xl mx-auto px-4 py-4 flex items-center justify-between")],
                [
                    html.a([att("href", links.page_href(Page::Home)),
                            class("logo flex-shrink-0 flex items-center gap-2 \
                                   hover:opacity-80 transition-opacity")],
                           logo)?,
                    html.button([class("menu-toggle md:hidden flex flex-col gap-1.5 \
                                        bg-transparent border-none cursor-pointer p-2"),
                                 att("id", "menuToggle")],
                                [bar()?, bar()?, bar()?])?,
                    html.nav([class("hidden md:flex gap-8 items-center"),
                              att("id", "navMenu")],
                             nav_links(html, &header.menu, links,
                                       "menu-link hover:text-cyan-300 transition-colors")?)?,
                    cta,
                ])?,
            html.nav([class("hidden flex-col gap-0 bg-black/25 max-h-0 overflow-hidden \
                             transition-all duration-300 pointer-events-none absolute w-full \
                             left-0 top-full"),
                      att("id", "mobileMenu")],
                     nav_links(html, &header.menu, links,
                               "menu-link block px-4 py-3 border-b border-white/30 \
                                hover:bg-white/10 transition-colors text-right \
                                pointer-events-auto")?)?,
        ])
}

fn footer_link_list(html: &Html, title: &'static str, items: &[Link], links: LinkStyle)
                    -> Result<Node>
{
    html.div(
        [],
        [
            html.h4([class("text-lg font-bold mb-4 pb-2 border-b border-gray-700")],
                    [html.staticstr(title)?])?,
            html.ul([class("space-y-2")],
                    items.iter().map(|link| {
                        html.li([], [
                            html.a([att("href", links.href(&link.url).as_ref()),
                                    class("text-gray-400 hover:text-cyan-400 transition-colors")],
                                   [html.string(&link.label)?])?])
                    }).try_collect_body()?)?,
        ])
}

pub fn render_footer(html: &Html, footer: &Footer, links: LinkStyle) -> Result<Node> {
    let newsletter = &footer.newsletter;
    html.footer(
        [class("bg-gray-900 text-white py-12 md:py-16 mt-12")],
        [
            html.div(
                [class("max-w-6xl mx-auto px-4 mb-8")],
                [html.div(
                    [class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-5 gap-8")],
                    [
                        html.div([class("lg:col-span-1")], [
                            html.h3([class("text-xl font-bold mb-2")],
                                    [html.staticstr("fttsolutions")?])?,
                            html.p([class("text-gray-400 text-sm")],
                                   [html.string(&footer.tagline)?])?,
                        ])?,
                        footer_link_list(html, "Quick Links", &footer.quick_links, links)?,
                        footer_link_list(html, "Company", &footer.company_links, links)?,
                        html.div([class("lg:col-span-2")], [
                            html.h4([class("text-lg font-bold mb-4 pb-2 border-b \
                                            border-gray-700")],
                                    [html.string(&newsletter.title)?])?,
                            html.p([class("text-gray-400 text-sm mb-4")],
                                   [html.string(&newsletter.description)?])?,
                            html.div([class("flex gap-2")], [
                                html.input([att("type", "email"),
                                            att("placeholder", &newsletter.placeholder),
                                            class("flex-1 px-4 py-2 rounded bg-gray-800 \
                                                   text-white placeholder-gray-500 \
                                                   focus:outline-none focus:ring-2 \
                                                   focus:ring-cyan-400")],
                                           [])?,
                                html.button([class("bg-cyan-400 hover:bg-cyan-500 \
                                                    text-gray-900 font-bold px-4 py-2 \
                                                    rounded transition-all")],
                                            [html.string(&newsletter.button_text)?])?,
                            ])?,
                        ])?,
                    ])?])?,
            html.div(
                [class("border-t border-gray-700 pt-8")],
                [html.div(
                    [class("max-w-6xl mx-auto px-4 flex flex-col md:flex-row items-center \
                            justify-between gap-4")],
                    [
                        html.div([class("text-center md:text-left text-gray-400 text-sm")],
                                 [html.string(&footer.copyright)?])?,
                        html.div([class("social flex gap-6 text-lg")],
                                 footer.social.iter().map(|s| {
                                     html.a([att("href", &s.url),
                                             att("target", "_blank"),
                                             att("rel", "noopener"),
                                             class("text-gray-400 hover:text-cyan-400 \
                                                    transition-colors")],
                                            [html.i([att("class", format!("bi {}", s.icon))],
                                                    [])?])
                                 }).try_collect_body()?)?,
                    ])?])?,
        ])
}

// ------------------------------------------------------------------
// Shared pieces

/// A centered page heading with a subtitle line.
fn page_heading(html: &Html, title: &'static str, subtitle: &'static str,
                wrapper_class: &'static str) -> Result<Node>
{
    html.div([class(wrapper_class)], [
        html.h1([class("text-4xl md:text-5xl font-bold text-gray-900 mb-4")],
                [html.staticstr(title)?])?,
        html.p([class("text-gray-600 text-lg")], [html.staticstr(subtitle)?])?,
    ])
}

fn gradient_hero(html: &Html, title: Node, subtitle: Option<Node>) -> Result<Node> {
    html.section(
        [class("bg-gradient-to-r from-blue-600 to-cyan-400 py-12 md:py-20 text-white \
                text-center")],
        [
            html.h1([class("text-4xl md:text-5xl font-bold")], [title])?,
            match subtitle {
                Some(s) => html.p([class("text-lg md:text-xl opacity-90 mt-4")], [s])?,
                None => html.empty_node()?,
            },
        ])
}

/// Icon card with an `<i>` icon, title and description.
fn icon_card(html: &Html, card_class: &'static str, icon_class: &'static str,
             icon: &str, title: &str, description: &str) -> Result<Node>
{
    html.div([class(card_class)], [
        html.i([att("class", format!("bi {icon} {icon_class}"))], [])?,
        html.h3([class("text-xl font-bold text-gray-900 mb-2")], [html.string(title)?])?,
        html.p([class("text-gray-600")], [html.string(description)?])?,
    ])
}

fn tag_badge(html: &Html, tag: &str) -> Result<Node> {
    html.span([class("bg-blue-100 text-blue-600 px-3 py-1 rounded-full text-sm font-semibold")],
              [html.string(tag)?])
}

fn step_card(html: &Html, card_class: &'static str, number_class: &'static str,
             step: &crate::content::ProcessStep) -> Result<Node>
{
    html.div([class(card_class)], [
        html.div([class(number_class)], [html.string(step.number.to_string())?])?,
        html.h3([class("text-xl font-bold text-gray-900 mb-2")], [html.string(&step.title)?])?,
        html.p([class("text-gray-600")], [html.string(&step.description)?])?,
    ])
}

fn project_card(html: &Html, category: &str, project: &crate::content::Project,
                with_technologies: bool) -> Result<Node>
{
    html.div(
        [class("bg-white rounded-lg overflow-hidden shadow-lg hover:shadow-2xl \
                hover:-translate-y-2 transition-all border border-gray-100")],
        [
            html.div([class("bg-gradient-to-r from-blue-600 to-cyan-400 h-40 flex items-center \
                              justify-center")],
                     [html.i([att("class", format!("{} text-white", project.icon)),
                              att("style", "font-size: 56px;")], [])?])?,
            html.div([class("p-6")], [
                html.div([class("inline-block bg-blue-100 text-blue-600 px-3 py-1 rounded-full \
                                 text-xs font-semibold mb-2")],
                         [html.string(category)?])?,
                html.h3([class("text-xl font-bold text-gray-900 mb-2")],
                        [html.string(&project.title)?])?,
                html.p([class("text-gray-600 text-sm mb-4")],
                       [html.string(&project.description)?])?,
                if with_technologies {
                    html.div([class("flex flex-wrap gap-2 mb-6")],
                             project.technologies.iter().map(|t| {
                                 html.span([class("bg-cyan-100 text-cyan-700 px-3 py-1 \
                                                   rounded-full text-sm font-semibold")],
                                           [html.string(t)?])
                             }).try_collect_body()?)?
                } else {
                    html.empty_node()?
                },
                if project.link.is_empty() {
                    html.empty_node()?
                } else {
                    html.a([att("href", &project.link),
                            att("target", "_blank"),
                            att("rel", "noopener"),
                            class("inline-block text-blue-600 hover:text-blue-700 \
                                   font-semibold text-sm")],
                           [html.staticstr("View Project →")?])?
                },
            ])?,
        ])
}

// ------------------------------------------------------------------
// Pages

pub fn render_home(html: &Html, page: &HomePage, app: &AppData, links: LinkStyle)
                   -> Result<Node>
{
    let hero = &page.hero;
    let sections = &page.sections;
    let services = &sections.services_overview;
    let stats = &sections.stats;
    let button = |href: Cow<'static, str>, style: &'static str, text: Node| {
        html.a([att("href", href), class(style)], [text])
    };
    Ok(html.div([], [
        html.section(
            [class("bg-gradient-to-r from-slate-800 via-blue-600 to-cyan-400 py-12 md:py-20")],
            [html.div(
                [class("max-w-6xl mx-auto px-4 grid grid-cols-1 md:grid-cols-2 gap-8 \
                        items-center")],
                [
                    html.div([class("text-white")], [
                        html.h1([class("text-4xl md:text-5xl font-bold mb-4 leading-tight")],
                                [html.string(&hero.title)?])?,
                        html.p([class("text-lg md:text-xl opacity-95 mb-8 leading-relaxed")],
                               [html.string(&hero.subtitle)?])?,
                        html.div([class("flex flex-col sm:flex-row gap-4")], [
                            button(links.page_href(Page::Contact),
                                   "bg-cyan-400 hover:bg-cyan-500 text-white px-6 py-3 rounded \
                                    font-semibold transition-all inline-block text-center",
                                   html.string(&hero.button_text)?)?,
                            button(links.page_href(Page::Services),
                                   "border-2 border-white hover:bg-white/10 text-white px-6 \
                                    py-3 rounded font-semibold transition-all inline-block \
                                    text-center",
                                   html.staticstr("Learn More")?)?,
                        ])?,
                    ])?,
                    html.div([class("hidden md:block")], [])?,
                ])?])?,
        html.section([class("py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.h2([class("text-3xl md:text-4xl font-bold text-center mb-12 text-gray-900")],
                        [html.staticstr("Why Choose Us")?])?,
                html.div([class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-6")],
                         sections.features.iter().map(|f| {
                             icon_card(html,
                                       "bg-gray-50 rounded-lg p-6 text-center hover:shadow-lg \
                                        hover:-translate-y-2 transition-all",
                                       "text-4xl text-blue-600 mb-4 block",
                                       &f.icon, &f.title, &f.description)
                         }).try_collect_body()?)?,
            ])?])?,
        html.section([class("bg-white py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.div([class("text-center mb-12")], [
                    html.h2([class("text-3xl md:text-4xl font-bold text-gray-900 mb-3")],
                            [html.staticstr("Our Recent Work")?])?,
                    html.p([class("text-gray-600 text-lg")],
                           [html.staticstr("Showcasing the projects we're proud of")?])?,
                ])?,
                html.div([class("grid grid-cols-1 md:grid-cols-2 gap-8 mb-8")],
                         app.all_projects().into_iter().take(2).map(|p| {
                             project_card(html, p.category, p.project, false)
                         }).try_collect_body()?)?,
                html.div([class("text-center")], [
                    button(links.page_href(Page::Portfolio),
                           "inline-block bg-blue-600 hover:bg-blue-700 text-white px-8 py-3 \
                            rounded-lg font-semibold transition-all",
                           html.staticstr("View All Projects →")?)?,
                ])?,
            ])?])?,
        html.section([class("bg-white py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.div([class("text-center mb-12")], [
                    html.h2([class("text-3xl md:text-4xl font-bold text-gray-900 mb-3")],
                            [html.string(&services.title)?])?,
                    html.p([class("text-gray-600 text-lg")],
                           [html.string(&services.subtitle)?])?,
                ])?,
                html.div([class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-5 gap-6")],
                         services.items.iter().map(|s| {
                             html.div(
                                 [class("bg-gray-50 rounded-lg p-6 hover:shadow-lg \
                                         hover:-translate-y-2 transition-all text-center group")],
                                 [
                                     html.div([class("inline-flex items-center justify-center \
                                                      w-16 h-16 bg-white rounded-lg mb-4 \
                                                      group-hover:bg-blue-50")],
                                              [html.i([att("class", format!(
                                                  "bi {} text-3xl text-blue-600", s.icon))],
                                                      [])?])?,
                                     html.h3([class("text-lg font-bold text-gray-900 mb-2")],
                                             [html.string(&s.title)?])?,
                                     html.p([class("text-gray-600 text-sm")],
                                            [html.string(&s.description)?])?,
                                 ])
                         }).try_collect_body()?)?,
            ])?])?,
        html.section([class("py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.div([class("grid grid-cols-1 md:grid-cols-3 gap-8 text-center")],
                         [(&stats.clients, "Clients"),
                          (&stats.projects, "Projects"),
                          (&stats.countries, "Countries")]
                         .into_iter().map(|(num, label)| {
                             html.div([class("bg-blue-600 text-white rounded-lg p-8")], [
                                 html.div([class("text-4xl md:text-5xl font-bold mb-2")],
                                          [html.string(format!("{num}+"))?])?,
                                 html.div([class("text-lg opacity-90")],
                                          [html.staticstr(label)?])?,
                             ])
                         }).try_collect_body()?)?,
            ])?])?,
        html.section([class("bg-gradient-to-br from-gray-100 to-blue-50 py-12 md:py-20")], [
            html.div([class("max-w-2xl mx-auto px-4 text-center")], [
                html.p([class("text-2xl font-semibold text-gray-900 mb-6")],
                       [html.string(&page.cta.text)?])?,
                button(links.page_href(Page::Contact),
                       "bg-cyan-400 hover:bg-cyan-500 text-white px-8 py-4 rounded \
                        font-semibold transition-all inline-block",
                       html.string(&page.cta.button_text)?)?,
            ])?])?,
    ])?)
}

/// Process steps for the services page: a row with arrows between
/// the steps for wide screens, a grid otherwise.
fn render_process_row(html: &Html, process: &Process) -> Result<Node> {
    let n = process.steps.len();
    let card = "step-card bg-white rounded-lg p-6 shadow-md hover:shadow-lg transition-all \
                border-2 border-blue-600";
    html.section([class("bg-gray-50 py-12 md:py-20")], [
        html.div([class("max-w-6xl mx-auto px-4 text-center")], [
            html.h2([class("text-3xl md:text-4xl font-bold text-gray-900 mb-12")],
                    [html.string(&process.title)?])?,
            html.div([class("hidden lg:flex items-stretch justify-center gap-0")],
                     process.steps.iter().enumerate().map(|(i, step)| {
                         html.div([class("flex flex-col flex-1")], [
                             step_card(html, "step-card bg-white rounded-lg p-6 shadow-md \
                                              hover:shadow-lg transition-all border-2 \
                                              border-blue-600 h-full",
                                       "text-5xl font-bold text-blue-600 mb-4", step)?,
                             if i + 1 < n {
                                 html.div([class("arrow")], [html.staticstr("→")?])?
                             } else {
                                 html.empty_node()?
                             },
                         ])
                     }).try_collect_body()?)?,
            html.div([class("lg:hidden grid grid-cols-1 md:grid-cols-2 gap-6")],
                     process.steps.iter().map(|step| {
                         step_card(html, card, "text-5xl font-bold text-blue-600 mb-4", step)
                     }).try_collect_body()?)?,
        ])?])
}

pub fn render_services(html: &Html, page: &ServicesPage) -> Result<Node> {
    let mut body = vec![
        html.section([class("bg-white py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                page_heading(html, "Our Services",
                             "Comprehensive solutions tailored to your needs",
                             "text-center mb-0")?])?])?,
    ];
    for (i, cat) in page.categories.iter().enumerate() {
        let section_class = match (i == 0, i % 2 == 0) {
            (true, _) => "-mt-8 md:-mt-12 py-0 md:py-0 bg-white",
            (false, true) => "py-0 md:py-0 bg-white",
            (false, false) => "py-0 md:py-0 bg-gray-50",
        };
        body.push(html.section([class(section_class)], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.h2([class("text-3xl md:text-4xl font-bold text-gray-900 mb-12")],
                        [html.string(&cat.name)?])?,
                html.div([class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-8")],
                         cat.services.iter().map(|s| {
                             html.div(
                                 [class("bg-white rounded-lg overflow-hidden shadow-lg \
                                         hover:shadow-2xl hover:-translate-y-2 transition-all \
                                         border border-gray-100")],
                                 [
                                     html.div([class("bg-gradient-to-r from-blue-600 \
                                                      to-cyan-400 h-32 flex items-center \
                                                      justify-center")],
                                              [html.i([att("class",
                                                           format!("{} text-white", s.icon)),
                                                       att("style", "font-size: 56px;")],
                                                      [])?])?,
                                     html.div([class("p-8")], [
                                         html.h3([class("text-xl font-bold text-gray-900 mb-3")],
                                                 [html.string(&s.title)?])?,
                                         html.p([class("text-gray-600 mb-6 text-sm \
                                                        leading-relaxed")],
                                                [html.string(&s.description)?])?,
                                         html.ul([class("space-y-3")],
                                                 s.features.iter().map(|f| {
                                                     html.li(
                                                         [class("text-gray-700 text-sm flex \
                                                                 items-start gap-2")],
                                                         [html.span(
                                                             [class("text-cyan-400 font-bold \
                                                                     text-lg leading-none \
                                                                     mt-0.5")],
                                                             [html.staticstr("✓")?])?,
                                                          html.span([], [html.string(f)?])?])
                                                 }).try_collect_body()?)?,
                                     ])?,
                                 ])
                         }).try_collect_body()?)?,
            ])?])?);
    }
    body.push(render_process_row(html, &page.process)?);
    html.div([], body)
}

pub fn render_portfolio(html: &Html, page: &PortfolioPage) -> Result<Node> {
    html.section([class("bg-white py-12 md:py-20")], [
        page_heading(html, "Our Portfolio", "Real projects we've delivered for our clients",
                     "max-w-6xl mx-auto px-4 text-center mb-16")?,
        html.div([class("max-w-7xl mx-auto px-4")], [
            html.div([class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-2 gap-8")],
                     page.all_projects().map(|p| {
                         project_card(html, p.category, p.project, true)
                     }).try_collect_body()?)?])?,
    ])
}

pub fn render_about(html: &Html, page: &AboutPage) -> Result<Node> {
    html.div([], [
        gradient_hero(html, html.string(&page.hero.title)?,
                      Some(html.string(&page.hero.subtitle)?))?,
        html.section([class("py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.div([class("grid grid-cols-1 lg:grid-cols-2 gap-12")], [
                    html.div([class("flex items-start gap-6")], [
                        html.i([class("bi bi-building text-5xl text-blue-600 flex-shrink-0 \
                                       mt-2")], [])?,
                        html.div([], [
                            html.h2([class("text-3xl font-bold text-gray-900 mb-4")],
                                    [html.string(&page.intro.title)?])?,
                            html.p([class("text-gray-600 text-lg leading-relaxed")],
                                   [html.string(&page.intro.description)?])?,
                        ])?,
                    ])?,
                    html.div([], [
                        html.div([class("flex items-center gap-3 mb-4")], [
                            html.i([class("bi bi-target text-5xl text-cyan-400")], [])?,
                            html.h2([class("text-3xl font-bold text-gray-900")],
                                    [html.staticstr("Our Mission")?])?,
                        ])?,
                        html.p([class("text-gray-600 text-lg leading-relaxed")],
                               [html.string(&page.mission)?])?,
                    ])?,
                ])?])?])?,
        html.section([class("bg-blue-50 py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.h2([class("text-3xl font-bold text-gray-900 text-center mb-12")],
                        [html.staticstr("Our Values")?])?,
                html.div([class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-6")],
                         page.values.iter().map(|v| {
                             icon_card(html,
                                       "bg-gray-50 rounded-lg p-6 text-center hover:shadow-lg \
                                        transition-all",
                                       "text-4xl text-cyan-400 mb-4 block",
                                       &v.icon, &v.title, &v.description)
                         }).try_collect_body()?)?,
            ])?])?,
        html.section([class("bg-gray-50 py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4")], [
                html.h2([class("text-3xl font-bold text-gray-900 text-center mb-12")],
                        [html.staticstr("Our Team")?])?,
                html.div([class("flex flex-wrap justify-center gap-8")],
                         page.team.iter().map(|m| {
                             html.div([class("w-full md:w-96 bg-white rounded-lg p-8 \
                                              text-center shadow-md")], [
                                 html.img([att("src", &m.image), att("alt", &m.name),
                                           class("w-56 h-56 rounded-full mx-auto mb-6 \
                                                  object-cover"),
                                           att("style", "object-position: center 20%;")],
                                          [])?,
                                 html.h3([class("text-2xl font-bold text-gray-900 mb-2")],
                                         [html.string(&m.name)?])?,
                                 html.p([class("text-cyan-400 font-semibold mb-4 text-lg")],
                                        [html.string(&m.role)?])?,
                                 html.p([class("text-gray-600 text-base")],
                                        [html.string(&m.bio)?])?,
                             ])
                         }).try_collect_body()?)?,
            ])?])?,
        html.section([class("py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4 text-center")], [
                html.h2([class("text-3xl md:text-4xl font-bold text-gray-900 mb-12")],
                        [html.string(&page.process.title)?])?,
                html.div([class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-6 gap-4")],
                         page.process.steps.iter().map(|step| {
                             step_card(html, "bg-blue-50 rounded-lg p-6",
                                       "text-3xl font-bold text-cyan-400 mb-3", step)
                         }).try_collect_body()?)?,
            ])?])?,
    ])
}

/// Link to the post a listing entry points to, or None if the entry
/// has no link.
fn post_link(links: LinkStyle, link: &Option<String>) -> Option<String> {
    link.as_deref().map(|l| links.post_href(post_id_from_link(l)))
}

pub fn render_blog(html: &Html, page: &BlogPage, links: LinkStyle) -> Result<Node> {
    html.div([], [
        gradient_hero(html, html.staticstr("Blog & Insights")?, None)?,
        html.section([class("py-12 md:py-20")], [
            html.div([class("max-w-6xl mx-auto px-4 grid grid-cols-1 lg:grid-cols-3 gap-8")], [
                html.div([class("lg:col-span-2")],
                         page.posts.iter().map(|post| {
                             html.article(
                                 [class("bg-white rounded-lg overflow-hidden shadow-md \
                                         hover:shadow-lg transition-all mb-6")],
                                 [
                                     html.img([att("src", &post.image), att("alt", &post.title),
                                               class("w-full h-64 object-cover bg-gray-300")],
                                              [])?,
                                     html.div([class("p-6")], [
                                         html.span([class("bg-cyan-400 text-white px-3 py-1 \
                                                           rounded-full text-sm \
                                                           font-semibold")],
                                                   [html.string(&post.category)?])?,
                                         html.h2([class("text-2xl font-bold text-gray-900 mt-3 \
                                                         mb-2")],
                                                 [html.string(&post.title)?])?,
                                         html.p([class("text-gray-500 text-sm mb-4")],
                                                [html.string(&post.date)?])?,
                                         html.p([class("text-gray-600 mb-4")],
                                                [html.string(&post.excerpt)?])?,
                                         match post_link(links, &post.link) {
                                             Some(href) => html.a(
                                                 [att("href", href),
                                                  class("text-cyan-400 font-semibold \
                                                         hover:text-cyan-500 \
                                                         transition-colors")],
                                                 [html.staticstr("Read More →")?])?,
                                             None => html.empty_node()?,
                                         },
                                     ])?,
                                 ])
                         }).try_collect_body()?)?,
                html.aside([class("space-y-6")], [
                    html.div([class("bg-gray-50 rounded-lg p-6")], [
                        html.h3([class("text-lg font-bold text-gray-900 mb-4")],
                                [html.staticstr("Popular Posts")?])?,
                        html.ul([class("space-y-3")],
                                page.sidebar.popular_posts.iter().map(|post| {
                                    html.li([], [
                                        html.a([opt_att("href", post_link(links, &post.link)),
                                                class("text-gray-600 hover:text-cyan-400 \
                                                       transition-colors text-left")],
                                               [html.string(&post.title)?])?])
                                }).try_collect_body()?)?,
                    ])?,
                    html.div([class("bg-gray-50 rounded-lg p-6")], [
                        html.h3([class("text-lg font-bold text-gray-900 mb-4")],
                                [html.staticstr("Tags")?])?,
                        html.div([class("flex flex-wrap gap-2")],
                                 page.sidebar.tags.iter().map(|t| tag_badge(html, t))
                                 .try_collect_body()?)?,
                    ])?,
                ])?,
            ])?])?,
    ])
}

/// Markdown to HTML. Raw HTML in the source is shown as text.
pub fn markdown_to_html(md: &str) -> String {
    let parser = Parser::new_ext(md, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(s) => Event::Text(s),
            e => e,
        });
    let mut out = String::new();
    push_html(&mut out, parser);
    out
}

pub fn render_blog_post(html: &Html, post: &BlogPost, links: LinkStyle) -> Result<Node> {
    html.section([class("py-12 md:py-20")], [
        html.article([class("max-w-4xl mx-auto px-4 bg-white rounded-lg")], [
            html.div([class("border-b border-gray-200 pb-6 mb-6")], [
                html.a([att("href", links.page_href(Page::Blog)),
                        class("text-cyan-400 hover:text-cyan-500 text-sm")],
                       [html.staticstr("← Blog & Insights")?])?,
                html.div([class("mt-4")], [
                    html.span([class("bg-cyan-400 text-white px-3 py-1 rounded-full text-sm \
                                      font-semibold")],
                              [html.string(&post.category)?])?])?,
                html.h1([class("text-3xl font-bold text-gray-900 mt-3 mb-2")],
                        [html.string(&post.title)?])?,
                html.p([class("text-gray-500 text-sm")],
                       [html.string(format!("{} · {}", post.date, post.read_time))?])?,
            ])?,
            match &post.author {
                Some(author) => html.div(
                    [class("flex items-center gap-4 mb-6 pb-6 border-b border-gray-200")],
                    [
                        html.img([att("src", &author.avatar), att("alt", &author.name),
                                  class("w-12 h-12 rounded-full bg-gray-300 flex-shrink-0")],
                                 [])?,
                        html.div([], [
                            html.p([class("font-semibold text-gray-900")],
                                   [html.string(&author.name)?])?,
                            html.p([class("text-sm text-gray-600")],
                                   [html.string(&author.bio)?])?,
                        ])?,
                    ])?,
                None => html.empty_node()?,
            },
            html.div([class("prose prose-sm max-w-none text-gray-700")],
                     [html.preserialized(markdown_to_html(&post.content))?])?,
            match &post.tags {
                Some(tags) => html.div([class("mt-6 pt-6 border-t border-gray-200")], [
                    html.div([class("flex flex-wrap gap-2")],
                             tags.iter().map(|t| tag_badge(html, t)).try_collect_body()?)?])?,
                None => html.empty_node()?,
            },
        ])?])
}

// ------------------------------------------------------------------
// Contact page

/// What the contact page shows besides the form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Fresh,
    /// Sent successfully, with the confirmation text.
    Sent(String),
    /// Validation or sending failed, with the message to show.
    Failed(String),
}

/// The contact form as to be rendered: state plus the values to
/// fill in again.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub state: FormState,
    pub values: ContactForm,
}

impl FormView {
    pub fn sent(message: String) -> FormView {
        FormView { state: FormState::Sent(message), values: ContactForm::default() }
    }
    pub fn failed(message: String, values: ContactForm) -> FormView {
        FormView { state: FormState::Failed(message), values }
    }
}

fn field_value<'f>(form: &'f ContactForm, name: &str) -> &'f str {
    match name {
        "name" => &form.name,
        "email" => &form.email,
        "phone" => &form.phone,
        "company" => &form.company,
        "subject" => &form.subject,
        "message" => &form.message,
        _ => ""
    }
}

/// Maps a social platform name to its icon class.
pub fn social_icon(platform: &str) -> &'static str {
    match platform {
        "twitter" => "bi-twitter",
        "instagram" => "bi-instagram",
        "facebook" => "bi-facebook",
        "linkedin" => "bi-linkedin",
        _ => "bi-link",
    }
}

fn render_alerts(html: &Html, state: &FormState) -> Result<Vec<Node>> {
    let (success, error) = match state {
        FormState::Fresh => (None, None),
        FormState::Sent(msg) => (Some(msg.as_str()), None),
        FormState::Failed(msg) => (None, Some(msg.as_str())),
    };
    Ok(vec![
        html.div([att("id", "successAlert"),
                  att("class", if success.is_some() {
                      "mb-6 p-4 rounded-lg bg-green-100 text-green-800"
                  } else {
                      "mb-6 p-4 rounded-lg bg-green-100 text-green-800 hidden"
                  })],
                 match success {
                     Some(msg) => vec![
                         html.i([class("bi bi-check-circle-fill")], [])?,
                         html.staticstr(" ")?,
                         html.strong([], [html.string(format!("✅ {msg}"))?])?,
                     ],
                     None => vec![],
                 })?,
        html.div([att("id", "errorAlert"),
                  att("class", if error.is_some() {
                      "mb-6 p-4 rounded-lg bg-red-100 text-red-800"
                  } else {
                      "mb-6 p-4 rounded-lg bg-red-100 text-red-800 hidden"
                  })],
                 [html.p([att("id", "errorMsg")],
                         match error {
                             Some(msg) => vec![
                                 html.i([class("bi bi-exclamation-circle-fill")], [])?,
                                 html.string(format!(" {msg}"))?,
                             ],
                             None => vec![],
                         })?])?,
    ])
}

fn render_form_fields(html: &Html, page: &ContactPage, app: &AppData, values: &ContactForm)
                      -> Result<Vec<Node>>
{
    let services = app.all_service_titles();
    page.form.fields.iter().map(|field| {
        let label = html.label([att("for", &field.name),
                                class("block text-gray-900 font-semibold mb-2")],
                               [html.string(&field.label)?])?;
        let value = field_value(values, &field.name);
        let control = if field.name == "subject" {
            let custom = values.subject == CUSTOM_SUBJECT;
            let mut options = vec![
                html.option([att("value", "")], [html.staticstr("-- Select a Service --")?])?,
            ];
            for svc in &services {
                options.push(html.option([att("value", *svc), flag_att("selected", value == *svc)],
                                         [html.string(*svc)?])?);
            }
            options.push(html.option([att("value", CUSTOM_SUBJECT), flag_att("selected", custom)],
                                     [html.staticstr("+ Add Custom Service")?])?);
            vec![
                html.select([att("id", &field.name), att("name", &field.name),
                             class(INPUT_CLASS), flag_att("required", field.required)],
                            options)?,
                html.input([att("type", "text"), att("id", "customSubject"),
                            att("name", "customSubject"),
                            att("placeholder", "Enter custom service..."),
                            opt_att("value", (!values.custom_subject.is_empty())
                                    .then(|| values.custom_subject.as_str())),
                            att("class", if custom {
                                format!("{INPUT_CLASS} mt-2")
                            } else {
                                format!("{INPUT_CLASS} mt-2 hidden")
                            })],
                           [])?,
            ]
        } else if field.field_type == "textarea" {
            vec![html.textarea([att("id", &field.name), att("name", &field.name),
                                class(INPUT_CLASS), att("rows", "5"),
                                flag_att("required", field.required)],
                               [html.string(value)?])?]
        } else {
            vec![html.input([att("type", &field.field_type), att("id", &field.name),
                             att("name", &field.name), class(INPUT_CLASS),
                             opt_att("value", (!value.is_empty()).then_some(value)),
                             flag_att("required", field.required)],
                            [])?]
        };
        let mut body = vec![label];
        body.extend(control);
        html.div([class("mb-6")], body)
    }).try_collect_body()
}

pub fn render_contact(html: &Html, page: &ContactPage, app: &AppData, links: LinkStyle,
                      view: &FormView) -> Result<Node>
{
    let contact = &page.info.contact;
    let tel: String = contact.phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut form_body = render_alerts(html, &view.state)?;
    form_body.extend(render_form_fields(html, page, app, &view.values)?);
    form_body.push(html.button([att("type", "submit"),
                                class("w-full bg-blue-600 hover:bg-blue-700 text-white py-3 \
                                       rounded-lg font-bold uppercase tracking-wider \
                                       transition-all")],
                               [html.string(&page.form.button.text)?])?);
    let info_row = |icon: &'static str, body: Node| {
        html.div([class("flex gap-4")], [
            html.div([class("text-2xl text-gray-400 flex-shrink-0")],
                     [html.staticstr(icon)?])?,
            html.div([], [body])?,
        ])
    };
    html.section([class("bg-white py-12 md:py-20")], [
        page_heading(html, "Get In Touch", "Contact us to discuss your project",
                     "max-w-6xl mx-auto px-4 text-center mb-12")?,
        html.div([class("max-w-6xl mx-auto px-4 grid grid-cols-1 lg:grid-cols-2 gap-12")], [
            html.form([class("bg-gray-50 rounded-lg p-8"), att("id", "contactForm"),
                       att("method", "post"), att("action", links.page_href(Page::Contact))],
                      form_body)?,
            html.div([class("bg-gray-50 rounded-lg p-8")], [
                html.h3([class("text-lg font-bold text-gray-900 mb-6")],
                        [html.staticstr("Contact Information")?])?,
                html.div([class("space-y-6")], [
                    info_row("📍", html.p([class("text-gray-900 font-semibold \
                                                   whitespace-pre-line")],
                                          [html.string(&contact.address)?])?)?,
                    info_row("✉️", html.a([att("href", format!("mailto:{}", contact.email)),
                                            class("text-gray-900 hover:text-blue-600 \
                                                   transition-colors")],
                                           [html.string(&contact.email)?])?)?,
                    info_row("📞", html.a([att("href", format!("tel:{tel}")),
                                           class("text-blue-600 hover:text-blue-700 \
                                                  transition-colors")],
                                          [html.string(&contact.phone)?])?)?,
                ])?,
                html.div([class("mt-8 pt-8 border-t border-gray-300")], [
                    html.p([class("text-gray-600 font-semibold mb-4")],
                           [html.staticstr("Follow Us")?])?,
                    html.div([class("flex gap-6 text-3xl")],
                             page.info.social.iter().flatten().map(|(platform, url)| {
                                 html.a([att("href", url), att("target", "_blank"),
                                         att("rel", "noopener"),
                                         class("text-gray-600 hover:text-blue-600 \
                                                transition-colors")],
                                        [html.i([att("class",
                                                     format!("bi {}", social_icon(platform)))],
                                                [])?])
                             }).try_collect_body()?)?,
                ])?,
            ])?,
        ])?,
    ])
}

// ------------------------------------------------------------------
// Dispatch

pub fn render_not_found(html: &Html) -> Result<Node> {
    html.div([class("not-found text-center py-20")],
             [html.h1([], [html.staticstr("Page not found")?])?])
}

/// The main content of a page, with the title for the document head
/// and the response status.
pub struct RenderedPage {
    pub status: HttpResponseStatusCode,
    pub title: String,
    pub main: Node,
}

impl RenderedPage {
    fn ok(title: impl Into<String>, main: Node) -> RenderedPage {
        RenderedPage { status: HttpResponseStatusCode::OK200, title: title.into(), main }
    }
    pub fn not_found(html: &Html) -> Result<RenderedPage> {
        Ok(RenderedPage {
            status: HttpResponseStatusCode::NotFound404,
            title: Route::NotFound(String::new()).title().into_owned(),
            main: render_not_found(html)?,
        })
    }
}

/// Render the page for `route`. Pages missing from the content
/// document and unknown posts are "Page not found".
pub fn render_page(html: &Html, route: &Route, content: &Content, links: LinkStyle,
                   form: &FormView) -> Result<RenderedPage>
{
    let app = &content.app;
    let pages = &app.pages;
    let title = route.title();
    let main = match route {
        Route::Page(Page::Home) => pages.home.as_ref()
            .map(|p| render_home(html, p, app, links)),
        Route::Page(Page::Services) => pages.services.as_ref()
            .map(|p| render_services(html, p)),
        Route::Page(Page::Portfolio) => pages.portfolio.as_ref()
            .map(|p| render_portfolio(html, p)),
        Route::Page(Page::About) => pages.about.as_ref()
            .map(|p| render_about(html, p)),
        Route::Page(Page::Blog) => pages.blog.as_ref()
            .map(|p| render_blog(html, p, links)),
        Route::Page(Page::Contact) => pages.contact.as_ref()
            .map(|p| render_contact(html, p, app, links, form)),
        Route::BlogPost(id) => match content.blog.post(id) {
            Some(post) => {
                return Ok(RenderedPage::ok(post.title.clone(),
                                           render_blog_post(html, post, links)?))
            }
            None => {
                warn!("blog post not found: {id:?}");
                None
            }
        },
        Route::NotFound(_) => None,
    };
    match main {
        Some(main) => Ok(RenderedPage::ok(title, main?)),
        None => RenderedPage::not_found(html),
    }
}

/// All pages present in the content as one document, for hash
/// links: each page is a section with the page name as id, the
/// stylesheet shows the `:target` one, or home if none is targeted
/// (home thus comes last).
pub fn render_single_document(html: &Html, content: &Content, form: &FormView)
                              -> Result<RenderedPage>
{
    let links = LinkStyle::Hash;
    let order = Page::ALL.into_iter()
        .filter(|p| *p != Page::Home)
        .chain(std::iter::once(Page::Home));
    let mut sections = Vec::new();
    for page in order {
        let rendered = render_page(html, &Route::Page(page), content, links, form)?;
        if rendered.status != HttpResponseStatusCode::OK200 {
            continue
        }
        sections.push(html.section(
            [att("id", page.name()), att("class", format!("page page-{}", page.name()))],
            [rendered.main])?);
    }
    if sections.is_empty() {
        return RenderedPage::not_found(html)
    }
    Ok(RenderedPage::ok(Page::Home.title(), html.div([], sections)?))
}

// ------------------------------------------------------------------
// Design tokens

fn is_safe_css_token(s: &str) -> bool {
    !s.chars().any(|c| matches!(c, '<' | '>' | '{' | '}' | ';' | '\n' | '\r'))
}

/// The design tokens as a `:root` block for a `<style>` element.
/// Colors are only emitted if `variables` is present, then each
/// variable followed by `--color-<name>` for each named color.
/// Entries that could break out of the declaration are skipped.
pub fn css_variables(design: &Design) -> String {
    let mut decls: Vec<(Cow<str>, Cow<str>)> = Vec::new();
    if let Some(variables) = &design.colors.variables {
        for (k, v) in variables {
            decls.push((k.into(), v.into()));
        }
        for (name, v) in design.colors.named_colors() {
            decls.push((format!("--color-{name}").into(), v.into()));
        }
    }
    if let Some(fonts) = &design.fonts {
        decls.push(("--font-primary".into(), format!("'{}'", fonts.primary).into()));
        decls.push(("--font-secondary".into(), format!("'{}'", fonts.secondary).into()));
    }
    let body = decls.into_iter()
        .filter(|(k, v)| {
            let safe = is_safe_css_token(k) && is_safe_css_token(v);
            if !safe {
                warn!("skipping unsafe CSS declaration {k:?}: {v:?}");
            }
            safe
        })
        .map(|(k, v)| format!("  {k}: {v};\n"))
        .join("");
    format!(":root {{\n{body}}}")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BlogData};
    use serde_json::json;

    fn app() -> AppData {
        serde_json::from_value(json!({
            "design": {
                "colors": {
                    "variables": {"--primary": "#0891b2"},
                    "accent": "#22d3ee",
                    "list": [1]
                },
                "fonts": {"primary": "Inter", "secondary": "Roboto"}
            },
            "global_components": {
                "header": {
                    "menu": [{"label": "Home", "url": "/"},
                             {"label": "Services", "url": "/services"}],
                    "cta_enabled": true, "cta_url": "/contact", "cta_text": "Get a Quote"
                },
                "footer": {
                    "tagline": "We <build> software",
                    "social": [{"url": "https://x.com/fttg", "icon": "bi-twitter"}]
                }
            },
            "pages": {
                "home": {
                    "hero": {"title": "Build", "subtitle": "Sub", "button_text": "Start"},
                    "sections": {
                        "features": [{"icon": "bi-star", "title": "Fast", "description": "d"}],
                        "services_overview": {"title": "What", "subtitle": "s", "items": []},
                        "stats": {"clients": 50, "projects": "120", "countries": 8}
                    },
                    "cta": {"text": "Ready?", "button_text": "Go"}
                },
                "services": {
                    "categories": [
                        {"name": "Web", "services": [
                            {"icon": "bi bi-code", "title": "Web Development",
                             "description": "d", "features": ["SPA"]}]},
                        {"name": "Cloud", "services": [
                            {"icon": "bi bi-cloud", "title": "Cloud Migration",
                             "description": "d", "features": []}]}
                    ],
                    "process": {"title": "How", "steps": [
                        {"number": 1, "title": "Talk", "description": "d"},
                        {"number": "02", "title": "Build", "description": "d"}]}
                },
                "portfolio": {"categories": [
                    {"name": "Apps", "projects": [
                        {"icon": "bi bi-phone", "title": "P1", "description": "d",
                         "technologies": ["Rust"], "link": "https://p1.example"},
                        {"icon": "bi bi-phone", "title": "P2", "description": "d",
                         "technologies": [], "link": ""}]},
                    {"name": "Sites", "projects": [
                        {"icon": "bi bi-globe", "title": "P3", "description": "d",
                         "technologies": [], "link": ""}]}
                ]},
                "blog": {
                    "posts": [{"title": "Rust on the web", "link": "/blog/rust-web",
                               "image": "/static/a.jpg", "category": "Tech",
                               "date": "2025-01-01", "excerpt": "e"},
                              {"title": "No link", "image": "", "category": "", "date": "",
                               "excerpt": ""}],
                    "sidebar": {"popularPosts": [{"title": "Rust on the web",
                                                  "link": "/blog/rust-web"}],
                                "tags": ["rust"]}
                },
                "contact": {
                    "form": {
                        "fields": [
                            {"name": "name", "label": "Name", "type": "text", "required": true},
                            {"name": "subject", "label": "Subject", "required": true},
                            {"name": "message", "label": "Message", "type": "textarea",
                             "required": true}
                        ],
                        "button": {"text": "Send Message"}
                    },
                    "info": {
                        "contact": {"address": "1 Main St", "email": "hi@fttg.example",
                                    "phone": "+1 (555) 123-4567"},
                        "social": {"linkedin": "https://linkedin.example", "mastodon": "https://m.example"}
                    }
                }
            }
        })).unwrap()
    }

    fn content() -> Content {
        let blog: BlogData = serde_json::from_value(json!({"posts": [
            {"id": "rust-web", "title": "Rust on the web", "category": "Tech",
             "date": "2025-01-01", "readTime": "5 min read",
             "author": {"name": "Ann", "avatar": "/a.png", "bio": "Dev"},
             "content": "## Intro\n\nSome **bold** text <script>x</script>",
             "tags": ["rust"]}
        ]})).unwrap();
        Content::from_parts(app(), blog)
    }

    fn render(route: Route, links: LinkStyle) -> (HttpResponseStatusCode, String) {
        let page = render_page(&Html, &route, &content(), links, &FormView::default()).unwrap();
        (page.status, page.main.to_html_fragment_string())
    }

    #[test]
    fn t_header_links() -> Result<()> {
        let app = app();
        let s = render_header(&Html, &app.global_components.header, LinkStyle::Hash)?
            .to_html_fragment_string();
        assert!(s.contains("href=\"#home\""));
        assert!(s.contains("href=\"#services\""));
        assert!(s.contains("id=\"mobileMenu\""));
        assert!(s.contains(">Get a Quote</a>"));
        let s = render_header(&Html, &app.global_components.header, LinkStyle::Path)?
            .to_html_fragment_string();
        assert!(s.contains("href=\"/services\""));
        Ok(())
    }

    #[test]
    fn t_footer_escapes() -> Result<()> {
        let app = app();
        let s = render_footer(&Html, &app.global_components.footer, LinkStyle::Path)?
            .to_html_fragment_string();
        assert!(s.contains("We &lt;build&gt; software"));
        assert!(s.contains("target=\"_blank\" rel=\"noopener\""));
        assert!(s.contains("<i class=\"bi bi-twitter\"></i>"));
        Ok(())
    }

    #[test]
    fn t_home() {
        let (status, s) = render(Route::Page(Page::Home), LinkStyle::Path);
        assert_eq!(status, HttpResponseStatusCode::OK200);
        assert!(s.contains("Why Choose Us"));
        assert!(s.contains(">50+<") && s.contains(">120+<") && s.contains(">8+<"));
        assert!(s.contains(">P1<") && s.contains(">P2<"));
        assert!(!s.contains(">P3<"));
        assert!(s.contains("href=\"/contact\""));
    }

    #[test]
    fn t_services_and_portfolio() {
        let (_, s) = render(Route::Page(Page::Services), LinkStyle::Path);
        assert!(s.contains("-mt-8 md:-mt-12 py-0 md:py-0 bg-white"));
        assert!(s.contains("py-0 md:py-0 bg-gray-50"));
        assert_eq!(s.matches("<div class=\"arrow\">→</div>").count(), 1);
        assert!(s.contains(">02<"));
        let (_, s) = render(Route::Page(Page::Portfolio), LinkStyle::Path);
        assert!(s.contains(">P3<") && s.contains(">Sites<"));
        assert_eq!(s.matches("View Project →").count(), 1);
    }

    #[test]
    fn t_blog_and_post() {
        let (_, s) = render(Route::Page(Page::Blog), LinkStyle::Hash);
        assert_eq!(s.matches("href=\"/blog/rust-web\"").count(), 2);
        assert_eq!(s.matches("Read More →").count(), 1);
        let (status, s) = render(Route::BlogPost("rust-web".into()), LinkStyle::Path);
        assert_eq!(status, HttpResponseStatusCode::OK200);
        assert!(s.contains("2025-01-01 · 5 min read"));
        assert!(s.contains("<h2>Intro</h2>"));
        assert!(s.contains("<strong>bold</strong>"));
        assert!(!s.contains("<script>"));
        let (status, _) = render(Route::BlogPost("nope".into()), LinkStyle::Path);
        assert_eq!(status, HttpResponseStatusCode::NotFound404);
    }

    #[test]
    fn t_not_found() {
        let (status, s) = render(Route::Page(Page::About), LinkStyle::Path);
        assert_eq!(status, HttpResponseStatusCode::NotFound404);
        assert!(s.contains("Page not found"));
        let (status, _) = render(Route::from_path("/pricing"), LinkStyle::Path);
        assert_eq!(status, HttpResponseStatusCode::NotFound404);
    }

    #[test]
    fn t_contact() -> Result<()> {
        let c = content();
        let page = c.app.pages.contact.as_ref().unwrap();
        let s = render_contact(&Html, page, &c.app, LinkStyle::Path, &FormView::default())?
            .to_html_fragment_string();
        assert!(s.contains("<option value=\"\">-- Select a Service --</option>"));
        assert!(s.contains("<option value=\"Cloud Migration\">Cloud Migration</option>"));
        assert!(s.contains("<option value=\"__custom\">+ Add Custom Service</option>"));
        assert!(s.contains("id=\"customSubject\""));
        assert!(s.contains("rows=\"5\""));
        assert!(s.contains("href=\"tel:15551234567\""));
        assert!(s.contains("bi bi-linkedin") && s.contains("bi bi-link\""));
        assert!(s.contains("id=\"successAlert\" class=\"mb-6 p-4 rounded-lg bg-green-100 \
                            text-green-800 hidden\""));

        let mut values = ContactForm::default();
        values.name = "<Ann>".into();
        values.subject = CUSTOM_SUBJECT.into();
        values.custom_subject = "Audit".into();
        let view = FormView::failed("⚠️ Valid email is required".into(), values);
        let s = render_contact(&Html, page, &c.app, LinkStyle::Path, &view)?.to_html_fragment_string();
        assert!(s.contains("value=\"&lt;Ann&gt;\""));
        assert!(s.contains("<option value=\"__custom\" selected=\"selected\">"));
        assert!(s.contains("value=\"Audit\""));
        assert!(s.contains("bi-exclamation-circle-fill\"></i> ⚠️ Valid email is required"));

        let s = render_contact(&Html, page, &c.app, LinkStyle::Hash,
                           &FormView::sent("Thanks".into()))?
            .to_html_fragment_string();
        assert!(s.contains("<strong>✅ Thanks</strong>"));
        assert!(s.contains("action=\"#contact\""));
        Ok(())
    }

    #[test]
    fn t_single_document() -> Result<()> {
        let page = render_single_document(&Html, &content(), &FormView::default())?;
        assert_eq!(page.status, HttpResponseStatusCode::OK200);
        let s = page.main.to_html_fragment_string();
        // about is missing from the content
        assert!(!s.contains("id=\"about\""));
        let services = s.find("<section id=\"services\" class=\"page page-services\">").unwrap();
        let home = s.find("<section id=\"home\" class=\"page page-home\">").unwrap();
        assert!(services < home);
        assert!(s.contains("href=\"#portfolio\""));
        Ok(())
    }

    #[test]
    fn t_css_variables() {
        let app = app();
        assert_eq!(css_variables(&app.design),
                   ":root {\n  --primary: #0891b2;\n  --color-accent: #22d3ee;\n  \
                    --font-primary: 'Inter';\n  --font-secondary: 'Roboto';\n}");
        let mut design = app.design.clone();
        design.colors.variables = None;
        design.fonts = None;
        assert_eq!(css_variables(&design), ":root {\n}");
        let mut design = app.design.clone();
        design.colors.variables = Some([("--x".to_string(), "red}</style>".to_string())]
                                       .into_iter().collect());
        assert!(!css_variables(&design).contains("</style>"));
    }
}
