use crate::style::owned_css::{load_owned_stylesheet, OwnedStylesheet};
use log::trace;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Read-through cache of parsed stylesheets, keyed by path and content digest.
///
/// The caller still reads the file every time; only parsing is skipped when the
/// SHA-256 of the content is unchanged. Unparseable content is cached as `None`.
#[derive(Debug, Default)]
pub struct StylesheetCache {
    entries: HashMap<PathBuf, CachedSheet>,
}

#[derive(Debug)]
struct CachedSheet {
    digest: [u8; 32],
    sheet: Option<Rc<OwnedStylesheet>>,
}

fn content_digest(text: &str) -> [u8; 32] {
    Sha256::digest(text.as_bytes()).into()
}

impl StylesheetCache {
    pub fn new() -> Self {
        StylesheetCache::default()
    }

    /// Parsed form of `text`, reusing the previous parse of `path` if the content matches.
    pub fn get_or_parse(&mut self, path: &Path, text: &str) -> Option<Rc<OwnedStylesheet>> {
        let digest = content_digest(text);
        if let Some(entry) = self.entries.get(path) {
            if entry.digest == digest {
                trace!("stylesheet cache hit for {}", path.display());
                return entry.sheet.clone();
            }
        }

        let sheet = load_owned_stylesheet(path, text).map(Rc::new);
        self.entries.insert(
            path.to_path_buf(),
            CachedSheet {
                digest,
                sheet: sheet.clone(),
            },
        );
        sheet
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
