//! Path prefix routing.

use std::fmt::Debug;

use kstring::KString;

use crate::ppath::{PPath, path_segments};

/// Allows multiple entries per path; they are to be tried in
/// sequence. Lookup picks the entry with the longest path that is a
/// prefix of the requested path, and returns the rest of the path
/// along with it.
#[derive(Debug)]
pub struct MultiRouter<T> {
    entries: Vec<(Vec<KString>, Vec<T>)>,
}

impl<T> Default for MultiRouter<T> {
    fn default() -> Self {
        MultiRouter { entries: Vec::new() }
    }
}

impl<T> MultiRouter<T> {
    pub fn new() -> MultiRouter<T> {
        Self::default()
    }

    /// Using path *strings*, and chaining.
    pub fn add(&mut self, path: &str, val: T) -> &mut Self
    where T: Debug
    {
        let pathv: Vec<KString> = path_segments(path).map(KString::from_ref).collect();
        match self.entries.iter_mut().find(|(p, _)| *p == pathv) {
            Some((_, v)) => v.push(val),
            None => self.entries.push((pathv, vec![val]))
        }
        self
    }

    pub fn get<P: AsRef<str> + Debug + Clone>(
        &self,
        path: &PPath<P>
    ) -> Option<(&Vec<T>, PPath<P>)>
    {
        let segments = path.segments();
        let (prefix, vals) = self.entries.iter()
            .filter(|(prefix, _)| {
                prefix.len() <= segments.len()
                    && prefix.iter().zip(segments).all(|(a, b)| a.as_str() == b.as_ref())
            })
            .max_by_key(|(prefix, _)| prefix.len())?;
        Some((vals, PPath::new(false, path.ends_with_slash(),
                               segments[prefix.len()..].to_vec())))
    }
}
