//! The HTTP response status codes used by the site, with the titles
//! and descriptions shown on error pages.

// https://developer.mozilla.org/en-US/docs/Web/HTTP/Status

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpResponseStatusCode {
    OK200,
    MovedPermanently301,
    Found302,
    SeeOther303,
    NotModified304,
    TemporaryRedirect307,
    PermanentRedirect308,
    BadRequest400,
    NotFound404,
    MethodNotAllowed405,
    InternalServerError500,
    NotImplemented501,
}

impl HttpResponseStatusCode {
    pub fn code(self) -> u16 {
        match self {
            Self::OK200 => 200,
            Self::MovedPermanently301 => 301,
            Self::Found302 => 302,
            Self::SeeOther303 => 303,
            Self::NotModified304 => 304,
            Self::TemporaryRedirect307 => 307,
            Self::PermanentRedirect308 => 308,
            Self::BadRequest400 => 400,
            Self::NotFound404 => 404,
            Self::MethodNotAllowed405 => 405,
            Self::InternalServerError500 => 500,
            Self::NotImplemented501 => 501,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::OK200 => "OK",
            Self::MovedPermanently301 => "Moved Permanently",
            Self::Found302 => "Found",
            Self::SeeOther303 => "See Other",
            Self::NotModified304 => "Not Modified",
            Self::TemporaryRedirect307 => "Temporary Redirect",
            Self::PermanentRedirect308 => "Permanent Redirect",
            Self::BadRequest400 => "Bad Request",
            Self::NotFound404 => "Page not found",
            Self::MethodNotAllowed405 => "Method Not Allowed",
            Self::InternalServerError500 => "Internal Server Error",
            Self::NotImplemented501 => "Not Implemented",
        }
    }

    pub fn desc(self) -> &'static str {
        match self {
            Self::OK200 => "The request succeeded.",
            Self::MovedPermanently301 =>
                "The URL of the requested resource has been changed permanently.",
            Self::Found302 =>
                "The URI of requested resource has been changed temporarily.",
            Self::SeeOther303 =>
                "The requested resource is to be fetched from another URI with a GET request.",
            Self::NotModified304 =>
                "The response has not been modified, the cached version can be used.",
            Self::TemporaryRedirect307 =>
                "The requested resource is to be fetched from another URI with the \
                 same method.",
            Self::PermanentRedirect308 =>
                "The resource is now permanently located at another URI, fetch it \
                 with the same method.",
            Self::BadRequest400 =>
                "The server could not understand the request.",
            Self::NotFound404 =>
                "The page you were looking for does not exist.",
            Self::MethodNotAllowed405 =>
                "The request method is not supported by the target resource.",
            Self::InternalServerError500 =>
                "The server has encountered a situation it does not know how to handle.",
            Self::NotImplemented501 =>
                "The request method is not supported by the server.",
        }
    }
}
