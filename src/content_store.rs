//! Loads the content documents from the data directory, keeps the
//! last loaded version for the request handlers, and picks up changes
//! to the files.

use std::{fs, io,
          path::{Path, PathBuf},
          sync::Arc,
          thread::{self, JoinHandle},
          time::Duration};

use anyhow::Result;
use thiserror::Error;

use crate::content::{AppData, BlogData};
use crate::miniarcswap::MiniArcSwap;
use crate::{info, loop_try, warn};

pub const APP_JSON_PATH: &str = "json/app.json";
pub const BLOG_JSON_PATH: &str = "json/blog.json";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Could not load app data. Please check json/app.json exists.")]
    AppDataRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not load app data. Please check json/app.json exists.")]
    AppDataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One consistent snapshot of both documents.
#[derive(Debug)]
pub struct Content {
    pub app: AppData,
    pub blog: BlogData,
    /// Hash over the bytes of both files, for change detection.
    pub fingerprint: blake3::Hash,
}

struct RawSources {
    app: Vec<u8>,
    blog: Option<Vec<u8>>,
    fingerprint: blake3::Hash,
}

impl Content {
    /// Build from already parsed documents. The fingerprint is that
    /// of empty input, so any files read later count as a change.
    pub fn from_parts(app: AppData, blog: BlogData) -> Content {
        Content { app, blog, fingerprint: blake3::hash(b"") }
    }
}

pub struct ContentStore {
    datadir: PathBuf,
    current: MiniArcSwap<Content>,
}

impl ContentStore {
    /// Load both documents from `datadir`. `json/app.json` is
    /// required, a missing or broken `json/blog.json` only gives a
    /// warning and an empty blog.
    pub fn open(datadir: impl Into<PathBuf>) -> Result<Arc<ContentStore>, ContentError> {
        let datadir = datadir.into();
        let raw = read_sources(&datadir)?;
        if raw.blog.is_none() {
            warn!("no blog data at {:?}, using an empty blog",
                  datadir.join(BLOG_JSON_PATH).to_string_lossy());
        }
        let content = parse_sources(&datadir, raw)?;
        info!("loaded content from {:?}: {} blog posts",
              datadir.to_string_lossy(), content.blog.posts.len());
        Ok(Arc::new(ContentStore {
            datadir,
            current: MiniArcSwap::new(Arc::new(content)),
        }))
    }

    /// A store that is never reloaded from disk (`datadir` is only
    /// used by `reload_if_changed`).
    pub fn from_content(datadir: impl Into<PathBuf>, content: Content) -> Arc<ContentStore> {
        Arc::new(ContentStore {
            datadir: datadir.into(),
            current: MiniArcSwap::new(Arc::new(content)),
        })
    }

    pub fn datadir(&self) -> &Path {
        &self.datadir
    }

    /// The last successfully loaded content.
    pub fn current(&self) -> Arc<Content> {
        self.current.get()
    }

    /// Re-read the files and publish the new content if they
    /// changed. Returns whether a new snapshot was published. On
    /// errors the previous snapshot stays in place.
    pub fn reload_if_changed(&self) -> Result<bool, ContentError> {
        let raw = read_sources(&self.datadir)?;
        if raw.fingerprint == self.current.get().fingerprint {
            return Ok(false)
        }
        let content = Arc::new(parse_sources(&self.datadir, raw)?);
        Ok(self.current.update_with(|old| {
            if old.fingerprint == content.fingerprint {
                None
            } else {
                Some(content)
            }
        }))
    }

    /// Check for changes every `interval` in a background thread.
    pub fn spawn_poller(self: &Arc<Self>, interval: Duration) -> Result<JoinHandle<()>> {
        let store = Arc::clone(self);
        Ok(thread::Builder::new().name("content_poller".into()).spawn(move || {
            loop_try! {
                thread::sleep(interval);
                if store.reload_if_changed()? {
                    let content = store.current();
                    info!("content changed, reloaded ({} blog posts)",
                          content.blog.posts.len());
                }
                Ok(())
            }
        })?)
    }
}

fn read_sources(datadir: &Path) -> Result<RawSources, ContentError> {
    let app_path = datadir.join(APP_JSON_PATH);
    let app = fs::read(&app_path).map_err(
        |source| ContentError::AppDataRead { path: app_path.clone(), source })?;
    let blog_path = datadir.join(BLOG_JSON_PATH);
    let blog = match fs::read(&blog_path) {
        Ok(b) => Some(b),
        // Reported once by `open`, not on every poll.
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!("Error loading blog data from {:?}: {e}", blog_path.to_string_lossy());
            None
        }
    };
    let mut hasher = blake3::Hasher::new();
    hasher.update(&app);
    // Separate the two inputs so that bytes moving from one file to
    // the other change the hash.
    hasher.update(&(app.len() as u64).to_le_bytes());
    if let Some(blog) = &blog {
        hasher.update(blog);
    }
    Ok(RawSources { app, blog, fingerprint: hasher.finalize() })
}

fn parse_sources(datadir: &Path, raw: RawSources) -> Result<Content, ContentError> {
    let app: AppData = serde_json::from_slice(&raw.app).map_err(
        |source| ContentError::AppDataParse { path: datadir.join(APP_JSON_PATH), source })?;
    let blog = match raw.blog {
        Some(bytes) => match serde_json::from_slice::<BlogData>(&bytes) {
            Ok(blog) => blog,
            Err(e) => {
                warn!("Error loading blog data: {e}");
                BlogData::default()
            }
        },
        None => BlogData::default(),
    };
    Ok(Content { app, blog, fingerprint: raw.fingerprint })
}
