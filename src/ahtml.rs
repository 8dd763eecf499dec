//! Html dom abstraction, with runtime checks.

//! Elements are built via methods on `Html` (`html.div(attrs,
//! body)?`), which check attribute names and refuse bodies for void
//! elements. Text is escaped on serialization, `Preserialized` nodes
//! are written out verbatim and must come from trusted sources
//! (e.g. the markdown renderer).

use std::borrow::Cow;

use anyhow::{Result, bail};
use kstring::KString;

const DOCTYPE: &str = "<!DOCTYPE html>\n";


#[derive(Debug)]
pub struct ElementMeta {
    pub tag_name: &'static str,
    /// False for void elements (`<br>`, `<input>`, ...).
    pub has_closing_tag: bool,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub meta: &'static ElementMeta,
    pub attr: Vec<(KString, KString)>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    String(KString),
    Preserialized(String),
    None,
}

// ------------------------------------------------------------------
// Conversions for attribute keys and values

pub trait ToKString {
    fn to_kstring(self) -> KString;
}

impl ToKString for &str {
    fn to_kstring(self) -> KString { KString::from_ref(self) }
}
impl ToKString for String {
    fn to_kstring(self) -> KString { KString::from_string(self) }
}
impl ToKString for &String {
    fn to_kstring(self) -> KString { KString::from_ref(self.as_str()) }
}
impl ToKString for KString {
    fn to_kstring(self) -> KString { self }
}
impl ToKString for &KString {
    fn to_kstring(self) -> KString { self.clone() }
}
impl ToKString for Cow<'_, str> {
    fn to_kstring(self) -> KString {
        match self {
            Cow::Borrowed(s) => KString::from_ref(s),
            Cow::Owned(s) => KString::from_string(s),
        }
    }
}

pub fn att<T: ToKString, U: ToKString>(key: T, val: U) -> Option<(KString, KString)> {
    Some((key.to_kstring(), val.to_kstring()))
}

pub fn opt_att<T: ToKString, U: ToKString>(key: T, val: Option<U>) -> Option<(KString, KString)> {
    val.map(|val| (key.to_kstring(), val.to_kstring()))
}

/// Boolean attribute like `required`: present (with its own name as
/// value) or absent.
pub fn flag_att(key: &'static str, on: bool) -> Option<(KString, KString)> {
    if on {
        Some((KString::from_static(key), KString::from_static(key)))
    } else {
        None
    }
}

fn is_valid_attribute_name(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_alphanumeric()
                         || b == b'-' || b == b'_' || b == b':')
}

// ------------------------------------------------------------------
// Escaping

/// Escape `& < > " '`, the apostrophe as `apostrophe`.
pub fn html_escape_into_with(out: &mut String, s: &str, apostrophe: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str(apostrophe),
            _ => out.push(c),
        }
    }
}

pub fn html_escape_into(out: &mut String, s: &str) {
    html_escape_into_with(out, s, "&#39;")
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    html_escape_into(&mut out, s);
    out
}

// ------------------------------------------------------------------
// Building

/// Element constructor namespace. Carries no state; exists so that
/// rendering code reads as `html.div(..)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html;

macro_rules! def_elements {
    { $( $name:ident => $closing:expr ),* $(,)? } => {
        impl Html {
            $(
                pub fn $name(
                    &self,
                    attr: impl IntoIterator<Item = Option<(KString, KString)>>,
                    body: impl IntoIterator<Item = Node>,
                ) -> Result<Node> {
                    static META: ElementMeta = ElementMeta {
                        tag_name: stringify!($name),
                        has_closing_tag: $closing,
                    };
                    self.element(&META, attr, body)
                }
            )*
        }
    }
}

def_elements! {
    html => true, head => true, body => true, title => true, meta => false,
    link => false, style => true, script => true,
    header => true, footer => true, main => true, nav => true, section => true,
    article => true, aside => true, div => true, span => true,
    h1 => true, h2 => true, h3 => true, h4 => true, p => true,
    a => true, i => true, strong => true, em => true, br => false, hr => false,
    ul => true, ol => true, li => true, img => false,
    form => true, label => true, input => false, textarea => true,
    select => true, option => true, button => true,
}

impl Html {
    pub fn element(
        &self,
        meta: &'static ElementMeta,
        attr: impl IntoIterator<Item = Option<(KString, KString)>>,
        body: impl IntoIterator<Item = Node>,
    ) -> Result<Node> {
        let mut attrs = Vec::new();
        for (k, v) in attr.into_iter().flatten() {
            if !is_valid_attribute_name(&k) {
                bail!("invalid attribute name {:?} for element {:?}", k.as_str(), meta.tag_name)
            }
            attrs.push((k, v));
        }
        let body: Vec<Node> = body.into_iter()
            .filter(|n| !matches!(n, Node::None))
            .collect();
        if !meta.has_closing_tag && !body.is_empty() {
            bail!("element {:?} is void and can't hold a body", meta.tag_name)
        }
        Ok(Node::Element(Element { meta, attr: attrs, body }))
    }

    pub fn string(&self, s: impl ToKString) -> Result<Node> {
        Ok(Node::String(s.to_kstring()))
    }

    pub fn staticstr(&self, s: &'static str) -> Result<Node> {
        Ok(Node::String(KString::from_static(s)))
    }

    /// Trusted HTML, written out without escaping.
    pub fn preserialized(&self, s: impl Into<String>) -> Result<Node> {
        Ok(Node::Preserialized(s.into()))
    }

    pub fn empty_node(&self) -> Result<Node> {
        Ok(Node::None)
    }
}

pub trait TryCollectBody {
    fn try_collect_body(&mut self) -> Result<Vec<Node>>;
}

impl<I: Iterator<Item = Result<Node>>> TryCollectBody for I {
    fn try_collect_body(&mut self) -> Result<Vec<Node>> {
        let mut v = Vec::new();
        for item in self {
            v.push(item?);
        }
        Ok(v)
    }
}

// ------------------------------------------------------------------
// Serializing

impl Node {
    pub fn print_html_fragment(&self, out: &mut String) {
        match self {
            Node::Element(e) => {
                out.push('<');
                out.push_str(e.meta.tag_name);
                for (k, v) in &e.attr {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    html_escape_into(out, v);
                    out.push('"');
                }
                out.push('>');
                for n in &e.body {
                    n.print_html_fragment(out);
                }
                if e.meta.has_closing_tag {
                    out.push_str("</");
                    out.push_str(e.meta.tag_name);
                    out.push('>');
                }
            }
            Node::String(s) => html_escape_into(out, s),
            Node::Preserialized(s) => out.push_str(s),
            Node::None => (),
        }
    }

    pub fn to_html_fragment_string(&self) -> String {
        let mut s = String::new();
        self.print_html_fragment(&mut s);
        s
    }
}

pub fn to_html_string(node: &Node, want_doctype: bool) -> String {
    let mut s = String::new();
    if want_doctype {
        s.push_str(DOCTYPE);
    }
    node.print_html_fragment(&mut s);
    s
}
