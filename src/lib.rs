pub mod warn;
pub mod util;
pub mod ahtml;
pub mod miniarcswap;
pub mod ppath;
pub mod router;
pub mod http_request_method;
pub mod http_response_status_codes;
pub mod acontext;
pub mod webutils;
pub mod handler;
pub mod in_threadpool;
pub mod apachelog;
pub mod config;

// ~website specific
pub mod content;
pub mod content_store;
pub mod route;
pub mod render;
pub mod mail;
pub mod form;
pub mod website_layout;
pub mod webparts;
