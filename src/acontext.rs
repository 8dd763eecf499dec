//! Per-request context handed to the handlers.

use std::net::IpAddr;
use std::time::SystemTime;

use anyhow::Result;
use kstring::KString;
use rouille::Request;

use crate::http_request_method::HttpRequestMethod;
use crate::ppath::PPath;

pub struct AContext<'r> {
    // Fallback for host(): what this server listens on
    listen_addr: &'r str,
    path: PPath<KString>,
    path_string: String,
    now: SystemTime,
    method: HttpRequestMethod,
    request: &'r Request,
}

impl<'r> AContext<'r> {
    pub fn new(request: &'r Request, listen_addr: &'r str) -> Result<Self> {
        let path: PPath<KString> = PPath::from_str(&request.url());
        let path_string = path.to_string();
        let method = HttpRequestMethod::from_str(request.method())?;
        Ok(AContext {
            listen_addr,
            path,
            path_string,
            now: SystemTime::now(),
            method,
            request,
        })
    }

    pub fn request(&self) -> &'r Request {
        self.request
    }

    /// Like the request part in Apache style Combined Log Format
    pub fn request_line(&self) -> String {
        // `Request` does not keep the original request line.
        format!("{} {}",
                self.request.method(),
                self.request.raw_url())
    }
    pub fn user_agent(&self) -> Option<&str> {
        self.request.header("user-agent")
    }
    pub fn referer(&self) -> Option<&str> {
        self.request.header("referer")
    }
    pub fn header(&self, key: &str) -> Option<&str> {
        self.request.header(key)
    }
    pub fn client_ip(&self) -> IpAddr {
        self.request.remote_addr().ip()
    }
    pub fn method(&self) -> HttpRequestMethod { self.method }
    pub fn path(&self) -> &PPath<KString> { &self.path }
    pub fn path_str(&self) -> &str { &self.path_string }
    pub fn now(&self) -> SystemTime { self.now }

    pub fn host_or_listen_addr(&self) -> &str {
        self.request.header("host").unwrap_or(self.listen_addr)
    }
}
