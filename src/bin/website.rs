use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use kstring::KString;
use website::acontext::AContext;
use website::ahtml::Html;
use website::apachelog::Logs;
use website::config::{Opts, SiteConfig};
use website::content_store::ContentStore;
use website::form::{FormConfig, FormService, HttpTransport, RelayTransport, SubmitTransport};
use website::handler::{FileHandler, FnHandler, RedirectHandler};
use website::http_response_status_codes::HttpResponseStatusCode;
use website::http_request_method::HttpRequestMethodSimple;
use website::mail::EmailRelay;
use website::ppath::PPath;
use website::util::log_basedir;
use website::webparts::{Pages, SiteRouter, pages_handler, serve};
use website::website_layout::WebsiteLayout;
use website::{info, warn};


fn main() -> Result<()> {
    let opts = Opts::parse();
    let config = SiteConfig::from_opts_and_env(&opts)?;
    info!("starting with {config:?}");

    let store = ContentStore::open(&config.datadir)?;
    if let Some(interval) = config.poll_interval {
        // The thread runs for the lifetime of the process
        let _poller = store.spawn_poller(interval)?;
    }

    let relay = Arc::new(EmailRelay::from_env()?);
    let (form_config, transport): (FormConfig, Arc<dyn SubmitTransport>) =
        match &config.form_api_endpoint {
            Some(endpoint) => (FormConfig { api_endpoint: endpoint.clone() },
                               Arc::new(HttpTransport::new()?)),
            None => (FormConfig::default(),
                     Arc::new(RelayTransport::new(relay.clone()))),
        };
    if !relay.is_configured() && config.form_api_endpoint.is_none() {
        warn!("contact form submissions will fail until the email relay is configured");
    }

    let pages = Arc::new(Pages {
        store: store.clone(),
        layout: Arc::new(WebsiteLayout::default()),
        links: config.link_style,
        form: FormService::new(form_config, transport),
    });

    let logbasedir = log_basedir()?;
    eprintln!("Logging to dir {logbasedir:?}");

    let datadir = store.datadir();
    let mut site = SiteRouter::new(Logs::open_in_basedir(&logbasedir, false)?);
    site.router
        .add("/", pages_handler(pages.clone()))
        .add("/static", Arc::new(FileHandler::new(datadir.join("static"))))
        .add("/json", Arc::new(FileHandler::new(datadir.join("json"))))
        .add("/index.html", Arc::new(RedirectHandler::new(
            |_: &AContext| "/".into(),
            HttpResponseStatusCode::MovedPermanently301)?));
    site.fallback = Some(Arc::new(FnHandler::new(
        move |_: &AContext, _: HttpRequestMethodSimple, _: &PPath<KString>, html: &Html| {
            pages.not_found(html).map(Some)
        })));
    site.relay = Some(relay);

    serve(config.listen_addr, Arc::new(site))
}
