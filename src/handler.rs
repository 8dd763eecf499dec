use std::fs::File;
use std::io::ErrorKind;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{fmt::Debug, any::type_name, path::PathBuf, borrow::Cow};

use anyhow::{Result, Context, anyhow};
use httpdate::{fmt_http_date, parse_http_date};
use kstring::KString;
use rouille::{Response, extension_to_mime, ResponseBody};

use crate::acontext::AContext;
use crate::ahtml::Html;
use crate::http_request_method::HttpRequestMethodSimple;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::ppath::PPath;
use crate::webutils::errorpage_from_status;
use crate::{or_return_none, warn};

// `fmt_http_date` drops the sub-second part, thus mtime is always a
// bit newer than what the client got; only count full seconds.
fn file_is_newer_than_snapshot_time(mtime: SystemTime, modsince: SystemTime) -> bool {
    match mtime.duration_since(modsince) {
        // older than the snapshot, or restored to an older version
        Err(_) => false,
        Ok(secsnewer) => secsnewer >= Duration::from_secs(1)
    }
}

macro_rules! cow {
    ($a:expr, $b:expr) => {
        (Cow::from($a), Cow::from($b))
    }
}

/// Drops `.` and empty segments, resolves `..`; None if the path
/// would leave the base.
pub fn canonicalize_path<'s, S>(path: &'s [S]) -> Option<Vec<&'s str>>
where S: AsRef<str> + 's
{
    let mut out = Vec::new();
    for segment in path {
        let segment = segment.as_ref();
        match segment {
            "." => (),
            ".." =>
                if out.pop().is_none() {
                    return None
                },
            "" => (),
            _ => out.push(segment)
        }
    }
    Some(out)
}


pub trait Handler: Debug + Send + Sync {
    /// Returning Ok(None) means, the handler is refusing to handle
    /// the request. It is to be handled as 404 not found by the
    /// caller, unless there's another alternative handler picking up
    /// the request. Err means, the handler has accepted to handle the
    /// request but failed to; this is turned into an internal server
    /// error.
    fn call(
        &self,
        request: &AContext,
        method: HttpRequestMethodSimple,
        pathrest: &PPath<KString>,
        html: &Html)
        -> Result<Option<Response>>;
}

// ------------------------------------------------------------------
/// Serve files from the local file system
#[derive(Debug)]
pub struct FileHandler {
    /// Base directory from which to serve the files. No ".." leaving
    /// it are allowed in the surplus of the request path.
    basepath: PathBuf,
}

impl FileHandler {
    pub fn new(basepath: impl Into<PathBuf>) -> FileHandler {
        FileHandler {
            basepath: basepath.into()
        }
    }
}

impl Handler for FileHandler {
    /// Returns None if the file does not exist
    fn call(
        &self,
        request: &AContext,
        method: HttpRequestMethodSimple,
        pathrest: &PPath<KString>,
        _html: &Html)
        -> Result<Option<Response>> {
        if method.is_post() {
            return Ok(Some(errorpage_from_status(
                HttpResponseStatusCode::MethodNotAllowed405)))
        }
        let canonpath = or_return_none!(canonicalize_path(pathrest.segments()));
        if canonpath.is_empty() {
            return Ok(None) // a directory
        }
        let full_path: PathBuf = self.basepath.join(canonpath.join("/"));

        let metadata =
            match full_path.metadata() {
                Ok(m) => m,
                Err(e) =>
                    match e.kind() {
                        ErrorKind::NotFound => return Ok(None),
                        _ => return Err(e).with_context(
                            || anyhow!("can't stat file: {:?}", full_path))
                    }
            };
        if !metadata.is_file() {
            warn!("not a file, not serving it: {full_path:?}");
            return Ok(None)
        }
        let mimetype = full_path.extension()
            .and_then(|e| e.to_str())
            .map(extension_to_mime)
            .unwrap_or("text/plain");
        let fh = match File::open(&full_path) {
            Ok(fh) => fh,
            Err(e) => match e.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(e).with_context(
                    || anyhow!("can't open file for reading: {:?}", full_path))
            }
        };
        let mtime: SystemTime = metadata.modified()?;
        // mtime in the future: treat as just modified
        let age: Duration = mtime.elapsed().unwrap_or_default();
        let age_allowed = age.as_secs() + age.as_secs() / 10;
        let expires = mtime.checked_add(Duration::from_secs(age_allowed)).ok_or_else(
            || anyhow!("time overflow for {full_path:?}"))?;
        let mtime_seconds = mtime.duration_since(UNIX_EPOCH)?.as_secs();
        let etag_quoted = format!("{:?}", mtime_seconds.to_string());

        let headers = vec![
            cow!("Content-type", mimetype),
            cow!("Last-Modified", fmt_http_date(mtime)),
            cow!("Cache-Control", format!("max-age={age_allowed}")),
            cow!("Expires", fmt_http_date(expires)),
            cow!("ETag", etag_quoted.clone()),
        ];
        let len = usize::try_from(metadata.len())?;
        let send_file = |headers| {
            Ok(Some(Response {
                status_code: HttpResponseStatusCode::OK200.code(),
                headers,
                data: ResponseBody::from_reader_and_size(fh, len),
                upgrade: None,
            }))
        };
        let send_notmodified = |headers| {
            Ok(Some(Response {
                status_code: HttpResponseStatusCode::NotModified304.code(),
                headers,
                data: ResponseBody::empty(),
                upgrade: None,
            }))
        };
        let modsince = request.header("If-Modified-Since").and_then(
            |modsince_str| match parse_http_date(modsince_str) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("ignoring invalid If-Modified-Since {modsince_str:?}: {e}");
                    None
                }
            });
        if let Some(modsince) = modsince {
            if file_is_newer_than_snapshot_time(mtime, modsince) {
                send_file(headers)
            } else {
                send_notmodified(headers)
            }
        } else if let Some(nonematch_str) = request.header("If-None-Match") {
            if nonematch_str == etag_quoted {
                send_notmodified(headers)
            } else {
                send_file(headers)
            }
        } else {
            send_file(headers)
        }
    }
}


// ------------------------------------------------------------------
/// A Handler that allows a path surplus, passing it to the handler
/// Fn. The handler may still refuse to handle the request (404).
#[derive(Clone, Copy)]
pub struct FnHandler<F>
where F: Fn(&AContext, HttpRequestMethodSimple, &PPath<KString>, &Html)
            -> Result<Option<Response>> + Send + Sync
{
    handler: F
}

impl<F> FnHandler<F>
where F: Fn(&AContext, HttpRequestMethodSimple, &PPath<KString>, &Html)
            -> Result<Option<Response>> + Send + Sync
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> Handler for FnHandler<F>
where F: Fn(&AContext, HttpRequestMethodSimple, &PPath<KString>, &Html)
            -> Result<Option<Response>> + Send + Sync
{
    fn call(
        &self,
        request: &AContext,
        method: HttpRequestMethodSimple,
        pathrest: &PPath<KString>,
        html: &Html) -> Result<Option<Response>>
    {
        (self.handler)(request, method, pathrest, html)
    }
}

impl<F> Debug for FnHandler<F>
where F: Fn(&AContext, HttpRequestMethodSimple, &PPath<KString>, &Html)
            -> Result<Option<Response>> + Send + Sync
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("FnHandler({})", type_name::<F>()))
    }
}

// ------------------------------------------------------------------
// Redirect handler

pub fn map_redirect(code: HttpResponseStatusCode) -> Option<Box<dyn Fn(String) -> Response>>
{
    match code {
        HttpResponseStatusCode::MovedPermanently301 => Some(Box::new(Response::redirect_301)),
        // ^ Instruct the client to do GET
        HttpResponseStatusCode::Found302 => Some(Box::new(Response::redirect_302)),
        HttpResponseStatusCode::SeeOther303 => Some(Box::new(Response::redirect_303)),
        // ^ Instruct the client to repeat the original method
        HttpResponseStatusCode::TemporaryRedirect307 => Some(Box::new(Response::redirect_307)),
        HttpResponseStatusCode::PermanentRedirect308 => Some(Box::new(Response::redirect_308)),
        _ => None
    }
}

pub struct RedirectHandler<F>
where F: Fn(&AContext) -> String + Send + Sync,
{
    calculate_target: F,
    code: HttpResponseStatusCode,
}

impl<F> RedirectHandler<F>
where F: Fn(&AContext) -> String + Send + Sync,
{
    /// Fails when given a `code` that's not a redirect.
    pub fn new(calculate_target: F, code: HttpResponseStatusCode) -> Result<Self> {
        if map_redirect(code).is_none() {
            anyhow::bail!("not a redirect status: {code:?}")
        }
        Ok(RedirectHandler { calculate_target, code })
    }
}

impl<F> Debug for RedirectHandler<F>
where F: Fn(&AContext) -> String + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("RedirectHandler(?, {:?})", self.code))
    }
}

impl<F> Handler for RedirectHandler<F>
where F: Fn(&AContext) -> String + Send + Sync,
{
    fn call(
        &self,
        request: &AContext,
        _method: HttpRequestMethodSimple,
        pathrest: &PPath<KString>,
        _html: &Html
    ) -> Result<Option<Response>> {
        if !pathrest.segments().is_empty() {
            return Ok(None)
        }
        let target = (self.calculate_target)(request);
        let responder = map_redirect(self.code).ok_or_else(
            || anyhow!("not a redirect status: {:?}", self.code))?;
        Ok(Some(responder(target)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use rouille::Request;

    #[test]
    fn t_canonicalize_path() {
        assert_eq!(canonicalize_path::<&str>(&[]), Some(vec![]));
        assert_eq!(canonicalize_path(&["a", "b"]), Some(vec!["a", "b"]));
        assert_eq!(canonicalize_path(&[".", "a", ".", "b", ".", ".."]),
                   Some(vec!["a"]));
        assert_eq!(canonicalize_path(&["a", "..", "b", ".."]),
                   Some(vec![]));
        assert_eq!(canonicalize_path(&["a", "..", ".", ".."]),
                   None);
        assert_eq!(canonicalize_path(&["..", "json", "app.json"]),
                   None);
        assert_eq!(canonicalize_path(&["foo", "", ".", "", "", "a", ".", ""]),
                   Some(vec!["foo", "a"]));
    }

    #[test]
    fn t_snapshot_time() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert!(!file_is_newer_than_snapshot_time(t + Duration::from_millis(300), t));
        assert!(file_is_newer_than_snapshot_time(t + Duration::from_secs(2), t));
        assert!(!file_is_newer_than_snapshot_time(t, t + Duration::from_secs(5)));
    }

    fn get_file(handler: &FileHandler, rest: &[&str], headers: Vec<(&str, String)>)
                -> Result<Option<Response>>
    {
        let request = Request::fake_http(
            "GET", format!("/static/{}", rest.join("/")),
            headers.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            vec![]);
        let context = AContext::new(&request, "127.0.0.1:3000")?;
        let pathrest = PPath::new(false, false,
                                  rest.iter().map(|s| KString::from_ref(s)).collect());
        handler.call(&context, HttpRequestMethodSimple::GET, &pathrest, &Html)
    }

    fn status(response: Option<Response>) -> Option<u16> {
        response.map(|r| r.status_code)
    }

    #[test]
    fn t_file_handler_lookup() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("site.css"), "body{}")?;
        let handler = FileHandler::new(dir.path());
        assert_eq!(status(get_file(&handler, &["site.css"], vec![])?), Some(200));
        assert!(get_file(&handler, &["missing.css"], vec![])?.is_none());
        assert!(get_file(&handler, &["..", "site.css"], vec![])?.is_none());
        assert!(get_file(&handler, &[], vec![])?.is_none());
        Ok(())
    }

    #[test]
    fn t_file_handler_not_modified() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("site.css");
        fs::write(&path, "body{}")?;
        let mtime = fs::metadata(&path)?.modified()?;
        let handler = FileHandler::new(dir.path());

        let response = get_file(&handler, &["site.css"], vec![])?.unwrap();
        let header = |name: &str| response.headers.iter()
            .find(|(k, _)| &**k == name)
            .map(|(_, v)| v.to_string());
        assert_eq!(header("Last-Modified"), Some(fmt_http_date(mtime)));
        let etag = header("ETag").unwrap();

        let modsince = |date: String| vec![("If-Modified-Since", date)];
        assert_eq!(status(get_file(&handler, &["site.css"], modsince(fmt_http_date(mtime)))?),
                   Some(304));
        assert_eq!(status(get_file(&handler, &["site.css"], modsince(fmt_http_date(UNIX_EPOCH)))?),
                   Some(200));

        assert_eq!(status(get_file(&handler, &["site.css"],
                                   vec![("If-None-Match", etag.clone())])?),
                   Some(304));
        assert_eq!(status(get_file(&handler, &["site.css"],
                                   vec![("If-None-Match", "\"1\"".into())])?),
                   Some(200));

        // An unparseable date is ignored
        assert_eq!(status(get_file(&handler, &["site.css"], modsince("yesterday".into()))?),
                   Some(200));
        assert_eq!(status(get_file(&handler, &["site.css"],
                                   vec![("If-Modified-Since", "yesterday".into()),
                                        ("If-None-Match", etag)])?),
                   Some(304));
        Ok(())
    }

    #[test]
    fn t_map_redirect() {
        assert!(map_redirect(HttpResponseStatusCode::SeeOther303).is_some());
        assert!(map_redirect(HttpResponseStatusCode::NotFound404).is_none());
        assert!(RedirectHandler::new(|_: &AContext| "/".into(),
                                     HttpResponseStatusCode::OK200).is_err());
    }
}
