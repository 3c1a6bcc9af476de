//! Session-scoped references to uploaded sound files.
//!
//! An uploaded sound is never copied: the designer hands out a
//! `blob:invitation-dashboard/<n>` URL that resolves to the file on disk for
//! as long as the matching [`SoundHandle`] is alive. Dropping the handle
//! releases the URL.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mime_guess::mime;
use tracing::debug;

use crate::error::DesignerError;

const URL_PREFIX: &str = "blob:invitation-dashboard/";

#[derive(Default)]
struct Entries {
    next_id: u64,
    live: HashMap<String, PathBuf>,
}

/// Table of live sound URLs for the current session.
#[derive(Clone, Default)]
pub struct SoundRegistry {
    entries: Rc<RefCell<Entries>>,
}

impl SoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `path` looks like an audio file and mint a handle for it.
    pub fn acquire(&self, path: &Path) -> Result<SoundHandle, DesignerError> {
        if path.as_os_str().is_empty() {
            return Err(DesignerError::EmptyPath);
        }
        if !is_audio_path(path) {
            return Err(DesignerError::UnsupportedAudio {
                path: path.to_path_buf(),
            });
        }
        let metadata = fs::metadata(path).map_err(|source| DesignerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(DesignerError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let mut entries = self.entries.borrow_mut();
        entries.next_id += 1;
        let url = format!("{URL_PREFIX}{}", entries.next_id);
        entries.live.insert(url.clone(), path.to_path_buf());
        debug!("acquired {url} for {}", path.display());

        Ok(SoundHandle {
            url,
            registry: self.clone(),
        })
    }

    /// File behind a live session URL.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        self.entries.borrow().live.get(url).cloned()
    }

    /// Number of handles that have not been released yet.
    pub fn live_count(&self) -> usize {
        self.entries.borrow().live.len()
    }

    fn release(&self, url: &str) {
        if self.entries.borrow_mut().live.remove(url).is_some() {
            debug!("released {url}");
        }
    }
}

/// Owner of one session URL. The URL stops resolving once this is dropped.
pub struct SoundHandle {
    url: String,
    registry: SoundRegistry,
}

impl SoundHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for SoundHandle {
    fn drop(&mut self) {
        self.registry.release(&self.url);
    }
}

impl std::fmt::Debug for SoundHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SoundHandle").field(&self.url).finish()
    }
}

/// Whether `url` is a session sound URL (live or already released).
pub fn is_session_url(url: &str) -> bool {
    url.starts_with(URL_PREFIX)
}

/// Whether the guessed mime type of `path` is some kind of audio.
fn is_audio_path(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|guess| guess.type_() == mime::AUDIO)
}
