//! Paths independent of the local file system (pure functions), as
//! they appear in request URLs.

use std::fmt::Debug;

use kstring::KString;

/// The non-empty segments of a path string.
pub fn path_segments(s: &str) -> impl Iterator<Item = &str> {
    s.split('/').filter(|s| !s.is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PPath<Segment: Clone + Debug> {
    is_absolute: bool,
    ends_with_slash: bool,
    segments: Vec<Segment>, // without empty ones
}

impl PPath<KString> {
    pub fn from_str(s: &str) -> Self {
        PPath {
            is_absolute: s.starts_with('/'),
            ends_with_slash: s.len() > 1 && s.ends_with('/'),
            segments: path_segments(s).map(KString::from_ref).collect()
        }
    }
}

impl<P: Clone + Debug + AsRef<str>> PPath<P> {
    pub fn to_string(&self) -> String {
        let mut s = String::new();
        if self.is_absolute {
            s.push('/');
        }
        let mut seen = false;
        for p in &self.segments {
            if seen {
                s.push('/');
            }
            s.push_str(p.as_ref());
            seen = true;
        }
        if self.ends_with_slash && seen {
            s.push('/');
        }
        s
    }
}

impl<P: Clone + Debug> PPath<P> {
    pub fn new(is_absolute: bool,
               ends_with_slash: bool,
               segments: Vec<P>
    ) -> Self {
        PPath { is_absolute, ends_with_slash, segments }
    }
    pub fn ends_with_slash(&self) -> bool {
        self.ends_with_slash
    }
    /// without empty ones
    pub fn segments(&self) -> &[P] {
        &self.segments
    }
}
