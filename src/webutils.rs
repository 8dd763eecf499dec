use std::borrow::Cow;

use anyhow::{Result, Error};
use rouille::{Response, ResponseBody};
use serde::Serialize;

use crate::ahtml::{Node, html_escape, to_html_string};
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::util::randomidstring;
use crate::warn;

fn plain_errorpage(status: HttpResponseStatusCode, extra: Option<&str>) -> Response {
    let title = html_escape(status.title());
    let explanation = html_escape(status.desc());
    let extra = extra.map(|s| format!("<p>{}</p>", html_escape(s))).unwrap_or_default();
    let resp = format!("<!DOCTYPE html>\n<html><head><title>{title}</title></head>\
                        <body><h1>{title}</h1><p>{explanation}</p>{extra}</body></html>\n");
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"), Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(resp),
        upgrade: None,
    }
}

pub fn errorpage_from_status(status: HttpResponseStatusCode) -> Response {
    plain_errorpage(status, None)
}

/// 500 page carrying an id that is also written to stderr along with
/// the error, so that reports can be matched up.
pub fn errorpage_from_error(err: &Error) -> Response {
    let status = HttpResponseStatusCode::InternalServerError500;
    let errid = randomidstring().unwrap_or_else(|_| "-".into());
    warn!("error id {errid} (returning {status:?}): {err:#}");
    plain_errorpage(status, Some(&format!("Error id: {errid}")))
}

pub fn htmlresponse(status: HttpResponseStatusCode, node: &Node) -> Response {
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"),
                       Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(to_html_string(node, true)),
        upgrade: None,
    }
}

/// The email endpoint is called from pages served elsewhere, too.
pub fn cors_headers() -> Vec<(Cow<'static, str>, Cow<'static, str>)> {
    vec![
        (Cow::from("Access-Control-Allow-Origin"), Cow::from("*")),
        (Cow::from("Access-Control-Allow-Methods"), Cow::from("POST, OPTIONS")),
        (Cow::from("Access-Control-Allow-Headers"), Cow::from("Content-Type")),
    ]
}

/// JSON response with CORS headers; without a body if `value` is None.
pub fn jsonresponse<T: Serialize>(status: HttpResponseStatusCode, value: Option<&T>)
                                  -> Result<Response>
{
    let mut headers = cors_headers();
    let data = match value {
        Some(value) => {
            headers.push((Cow::from("Content-type"),
                          Cow::from("application/json; charset=utf-8")));
            ResponseBody::from_string(serde_json::to_string(value)?)
        }
        None => ResponseBody::empty(),
    };
    Ok(Response {
        status_code: status.code(),
        headers,
        data,
        upgrade: None,
    })
}
