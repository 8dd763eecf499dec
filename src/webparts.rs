//! Wiring the pages, static files and the email endpoint into a
//! request handler for rouille.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Result, Context, anyhow};
use kstring::KString;
use rouille::input::post::{PostError, raw_urlencoded_post_input};
use rouille::{Request, Response, Server};
use scoped_thread_pool::Pool;

use crate::acontext::AContext;
use crate::ahtml::{Html, Node};
use crate::apachelog::{Logs, log_combined};
use crate::content_store::{Content, ContentStore};
use crate::form::{ContactForm, FormService};
use crate::handler::{FnHandler, Handler};
use crate::http_request_method::{HttpRequestMethodGrouped, HttpRequestMethodSimple};
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::in_threadpool::in_threadpool;
use crate::mail::EmailRelay;
use crate::ppath::PPath;
use crate::render::{FormView, RenderedPage, render_page, render_single_document};
use crate::route::{LinkStyle, Page, Route};
use crate::router::MultiRouter;
use crate::webutils::{errorpage_from_status, htmlresponse, jsonresponse};
use crate::{info, time_guard, warn};

pub const SEND_EMAIL_PATH: &str = "/api/send-email";

/// Larger request bodies for the email endpoint are cut off (and then
/// fail to parse).
pub const MAX_EMAIL_BODY_BYTES: u64 = 64 * 1024;

pub trait LayoutInterface: Send + Sync {
    /// Wrap a rendered page into the full document (head, header,
    /// footer).
    fn page(
        &self,
        html: &Html,
        content: &Content,
        links: LinkStyle,
        page: RenderedPage,
    ) -> Result<Node>;
}

/// What the page handlers need, shared across requests.
pub struct Pages {
    pub store: Arc<ContentStore>,
    pub layout: Arc<dyn LayoutInterface>,
    pub links: LinkStyle,
    pub form: FormService,
}

impl Pages {
    fn respond(&self, html: &Html, content: &Content, links: LinkStyle, page: RenderedPage)
               -> Result<Response>
    {
        let status = page.status;
        let document = self.layout.page(html, content, links, page)?;
        Ok(htmlresponse(status, &document))
    }

    /// The document for unknown paths.
    pub fn not_found(&self, html: &Html) -> Result<Response> {
        let content = self.store.current();
        self.respond(html, &content, LinkStyle::Path, RenderedPage::not_found(html)?)
    }

    fn submit_contact_form(&self, form: ContactForm) -> FormView {
        match self.form.submit(&form) {
            Ok(message) => FormView::sent(message),
            Err(e) => {
                warn!("contact form submission failed: {e}");
                FormView::failed(e.user_message(), form)
            }
        }
    }

    /// Render the page for the request path. In hash mode the root
    /// carries all pages in one document.
    pub fn handle(
        &self,
        context: &AContext,
        method: HttpRequestMethodSimple,
        html: &Html,
    ) -> Result<Response>
    {
        let content = self.store.current();
        let route = Route::from_path(context.path_str());
        let is_document_root = self.links == LinkStyle::Hash
            && route == Route::Page(Page::Home);
        let accepts_form = is_document_root || route == Route::Page(Page::Contact);

        let form = if method.is_post() {
            if !accepts_form {
                if let Route::NotFound(_) = route {
                    return self.not_found(html)
                }
                return Ok(errorpage_from_status(HttpResponseStatusCode::MethodNotAllowed405))
            }
            let pairs = match raw_urlencoded_post_input(context.request()) {
                Ok(pairs) => pairs,
                Err(e @ (PostError::WrongContentType | PostError::NotUtf8(_))) => {
                    warn!("contact form not urlencoded: {e}");
                    return Ok(errorpage_from_status(HttpResponseStatusCode::BadRequest400))
                }
                Err(e) => return Err(anyhow!("reading contact form: {e}")),
            };
            self.submit_contact_form(ContactForm::from_pairs(pairs))
        } else {
            FormView::default()
        };

        if is_document_root {
            let page = render_single_document(html, &content, &form)?;
            self.respond(html, &content, LinkStyle::Hash, page)
        } else {
            // Separate documents always link by path
            let page = render_page(html, &route, &content, LinkStyle::Path, &form)?;
            self.respond(html, &content, LinkStyle::Path, page)
        }
    }
}

pub fn pages_handler(pages: Arc<Pages>) -> Arc<dyn Handler> {
    Arc::new(FnHandler::new(
        move |context: &AContext, method: HttpRequestMethodSimple,
              _pathrest: &PPath<KString>, html: &Html| -> Result<Option<Response>> {
            pages.handle(context, method, html).map(Some)
        }))
}

/// The JSON email endpoint, with CORS headers on every answer.
pub fn send_email_response(context: &AContext, relay: &EmailRelay) -> Result<Response> {
    let mut body = Vec::new();
    if context.method().is_post() {
        if let Some(data) = context.request().data() {
            data.take(MAX_EMAIL_BODY_BYTES).read_to_end(&mut body)
                .with_context(|| anyhow!("reading request body"))?;
        }
    }
    let reply = relay.handle(context.method(), &body);
    jsonresponse(reply.status, reply.body.as_ref())
}


pub struct SiteRouter {
    pub router: MultiRouter<Arc<dyn Handler>>,
    /// Used when no handler in the router accepts the request.
    pub fallback: Option<Arc<dyn Handler>>,
    /// Serves `SEND_EMAIL_PATH` for all methods, if present.
    pub relay: Option<Arc<EmailRelay>>,
    pub logs: Arc<Mutex<Logs>>,
}

impl SiteRouter {
    pub fn new(logs: Arc<Mutex<Logs>>) -> SiteRouter {
        SiteRouter {
            router: MultiRouter::new(),
            fallback: None,
            relay: None,
            logs,
        }
    }

    fn route(&self, context: &AContext, method: HttpRequestMethodSimple)
             -> Result<Response>
    {
        let html = Html;
        if let Some((handlers, pathrest)) = self.router.get(context.path()) {
            for handler in handlers {
                if let Some(response) = handler.call(context, method, &pathrest, &html)? {
                    return Ok(response)
                }
            }
        }
        if let Some(fallback) = &self.fallback {
            let empty = PPath::new(false, false, vec![]);
            if let Some(response) = fallback.call(context, method, &empty, &html)? {
                return Ok(response)
            }
        }
        Ok(errorpage_from_status(HttpResponseStatusCode::NotFound404))
    }

    pub fn handle_request(&self, context: &AContext)
                          -> (Arc<Mutex<Logs>>, Result<Response>)
    {
        let result = (|| {
            if let Some(relay) = &self.relay {
                if context.path_str() == SEND_EMAIL_PATH {
                    return send_email_response(context, relay)
                }
            }
            match context.method().to_grouped() {
                HttpRequestMethodGrouped::Simple(method) => self.route(context, method),
                HttpRequestMethodGrouped::Document(_) |
                HttpRequestMethodGrouped::Special(_) =>
                    Ok(errorpage_from_status(HttpResponseStatusCode::NotImplemented501)),
            }
        })();
        (self.logs.clone(), result)
    }
}


pub fn server_handler(
    listen_addr: String,
    site: Arc<SiteRouter>,
    threadpool: Arc<Pool>,
) -> impl Fn(&Request) -> Response
{
    move |request: &Request| -> Response {
        time_guard!("server_handler");
        let result = in_threadpool(threadpool.clone(), || -> Response {
            match AContext::new(request, &listen_addr) {
                Ok(context) => log_combined(&context, || site.handle_request(&context)),
                Err(e) => {
                    warn!("rejecting request {:?} {:?}: {e:#}",
                          request.method(), request.raw_url());
                    errorpage_from_status(HttpResponseStatusCode::NotImplemented501)
                }
            }
        });
        match result {
            Ok(response) => response,
            Err(e) => {
                warn!("thread pool: {e:#}");
                errorpage_from_status(HttpResponseStatusCode::InternalServerError500)
            }
        }
    }
}

/// Run the HTTP server for `site` in a "website_http" thread, with
/// the handlers executing in a separate worker pool. Returns when the
/// server stops.
pub fn serve(listen_addr: String, site: Arc<SiteRouter>) -> Result<()> {
    // Kept separate and smaller than tiny_http's own pool, so that
    // the CPU intensive part finishes quickly.
    let workerthreadpool_size = 8 * thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let workerthreadpool = {
        let cfg = scoped_thread_pool::ThreadConfig::new()
            .prefix("scoped_website_worker");
        Arc::new(Pool::with_thread_config(workerthreadpool_size, cfg))
    };
    let http_thread = thread::Builder::new().name("website_http".into()).spawn(
        move || -> Result<()> {
            let server = Server::new(
                listen_addr.clone(),
                server_handler(listen_addr.clone(), site, workerthreadpool))
                .map_err(|e| anyhow!("can't listen on {listen_addr:?}: {e}"))?;
            info!("listening on http://{listen_addr}");
            server.run();
            Ok(())
        })?;
    http_thread.join().map_err(|_| anyhow!("website_http thread panicked"))?
}
