//! Pattern matching help for HTTP request methods.

// https://developer.mozilla.org/en-US/docs/Web/HTTP/Methods

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethod {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

/// The methods page handlers deal with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethodSimple {
    GET,
    HEAD,
    POST,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethodDocument {
    PUT,
    DELETE,
    PATCH,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethodSpecial {
    OPTIONS,
    TRACE,
    CONNECT,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethodGrouped {
    Simple(HttpRequestMethodSimple),
    Document(HttpRequestMethodDocument),
    Special(HttpRequestMethodSpecial)
}

impl HttpRequestMethodSimple {
    pub fn is_post(self) -> bool {
        self == HttpRequestMethodSimple::POST
    }
    pub fn to_http_request_method(self) -> HttpRequestMethod {
        match self {
            HttpRequestMethodSimple::GET => HttpRequestMethod::GET,
            HttpRequestMethodSimple::HEAD => HttpRequestMethod::HEAD,
            HttpRequestMethodSimple::POST => HttpRequestMethod::POST
        }
    }
}

impl HttpRequestMethodDocument {
    pub fn to_http_request_method(self) -> HttpRequestMethod {
        match self {
            HttpRequestMethodDocument::PUT => HttpRequestMethod::PUT,
            HttpRequestMethodDocument::DELETE => HttpRequestMethod::DELETE,
            HttpRequestMethodDocument::PATCH => HttpRequestMethod::PATCH,
        }
    }
}

impl HttpRequestMethodSpecial {
    pub fn to_http_request_method(self) -> HttpRequestMethod {
        match self {
            HttpRequestMethodSpecial::OPTIONS => HttpRequestMethod::OPTIONS,
            HttpRequestMethodSpecial::TRACE => HttpRequestMethod::TRACE,
            HttpRequestMethodSpecial::CONNECT => HttpRequestMethod::CONNECT,
        }
    }
}

impl HttpRequestMethodGrouped {
    pub fn to_http_request_method(self) -> HttpRequestMethod {
        match self {
            HttpRequestMethodGrouped::Simple(v) => v.to_http_request_method(),
            HttpRequestMethodGrouped::Document(v) => v.to_http_request_method(),
            HttpRequestMethodGrouped::Special(v) => v.to_http_request_method(),
        }
    }
}

impl HttpRequestMethod {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(Self::GET),
            "HEAD" => Ok(Self::HEAD),
            "POST" => Ok(Self::POST),
            "PUT" => Ok(Self::PUT),
            "PATCH" => Ok(Self::PATCH),
            "DELETE" => Ok(Self::DELETE),
            "OPTIONS" => Ok(Self::OPTIONS),
            "CONNECT" => Ok(Self::CONNECT),
            "TRACE" => Ok(Self::TRACE),
            _ => bail!("invalid http request method {s:?}")
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::PATCH => "PATCH",
            Self::DELETE => "DELETE",
            Self::OPTIONS => "OPTIONS",
            Self::CONNECT => "CONNECT",
            Self::TRACE => "TRACE",
        }
    }

    pub fn is_post(self) -> bool {
        self == Self::POST
    }

    pub fn is_options(self) -> bool {
        self == Self::OPTIONS
    }

    pub fn to_grouped(self) -> HttpRequestMethodGrouped {
        use HttpRequestMethodGrouped::*;
        match self {
            Self::GET => Simple(HttpRequestMethodSimple::GET),
            Self::HEAD => Simple(HttpRequestMethodSimple::HEAD),
            Self::POST => Simple(HttpRequestMethodSimple::POST),

            Self::PUT => Document(HttpRequestMethodDocument::PUT),
            Self::PATCH => Document(HttpRequestMethodDocument::PATCH),
            Self::DELETE => Document(HttpRequestMethodDocument::DELETE),

            Self::OPTIONS => Special(HttpRequestMethodSpecial::OPTIONS),
            Self::CONNECT => Special(HttpRequestMethodSpecial::CONNECT),
            Self::TRACE => Special(HttpRequestMethodSpecial::TRACE),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_from_str_grouped() -> Result<()> {
        for s in ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "CONNECT", "TRACE"] {
            let m = HttpRequestMethod::from_str(s)?;
            assert_eq!(m.as_str(), s);
            assert_eq!(m.to_grouped().to_http_request_method(), m);
        }
        assert!(HttpRequestMethod::from_str("get").is_err());
        assert_eq!(HttpRequestMethod::OPTIONS.to_grouped(),
                   HttpRequestMethodGrouped::Special(HttpRequestMethodSpecial::OPTIONS));
        Ok(())
    }
}
