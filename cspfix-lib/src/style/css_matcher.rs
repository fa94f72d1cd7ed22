use crate::error::ConvertError;
use crate::style::cache::StylesheetCache;
use crate::style::owned_css::{load_owned_stylesheet, OwnedStylesheet};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Where an existing class was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMatch {
    pub class_name: String,
    pub source: PathBuf,
}

/// Class name of a selector that is exactly one class, e.g. `.btn` -> `btn`.
///
/// Compound, chained, pseudo and combinator selectors return `None`.
pub fn single_class_name(selector: &str) -> Option<&str> {
    let name = selector.trim().strip_prefix('.')?;
    let disqualified = name.is_empty()
        || name.contains(|c: char| {
            c.is_whitespace() || matches!(c, '.' | ':' | '+' | '>' | '~' | '[' | '#' | '*' | ',')
        });
    if disqualified {
        None
    } else {
        Some(name)
    }
}

/// Candidate equality, also allowing the candidate one extra trailing `!important`.
fn declarations_equivalent(candidate: &str, target: &str) -> bool {
    if candidate == target {
        return true;
    }
    let trimmed = candidate.trim_end();
    trimmed
        .strip_suffix("!important")
        .map_or(false, |stripped| stripped.trim_end() == target)
}

/// First single-class rule of `sheet` whose declarations match `target`, in file order.
pub fn match_in_sheet<'a>(sheet: &'a OwnedStylesheet, target: &str) -> Option<&'a str> {
    sheet
        .rules
        .iter()
        .filter(|rule| rule.selectors.len() == 1 && !rule.declarations.is_empty())
        .find_map(|rule| {
            let class_name = single_class_name(&rule.selectors[0])?;
            declarations_equivalent(&rule.canonical_declarations(), target).then_some(class_name)
        })
}

/// Search one stylesheet's text for a class equivalent to `target`.
///
/// Unparseable text is logged and treated as "no match".
pub fn find_matching_class(stylesheet_text: &str, target: &str) -> Option<String> {
    let sheet = load_owned_stylesheet(Path::new("<inline>"), stylesheet_text)?;
    match_in_sheet(&sheet, target).map(str::to_string)
}

/// Searches configured stylesheets, in order, for an existing class.
#[derive(Debug, Default)]
pub struct StylesheetMatcher {
    cache: Option<StylesheetCache>,
}

impl StylesheetMatcher {
    /// A matcher that parses every source on every lookup.
    pub fn new() -> Self {
        StylesheetMatcher { cache: None }
    }

    pub fn with_cache(cache: StylesheetCache) -> Self {
        StylesheetMatcher { cache: Some(cache) }
    }

    pub fn cache(&self) -> Option<&StylesheetCache> {
        self.cache.as_ref()
    }

    /// Forget anything cached for `path`; call after writing to it.
    pub fn invalidate(&mut self, path: &Path) {
        if let Some(cache) = self.cache.as_mut() {
            if cache.invalidate(path) {
                debug!("invalidated cached stylesheet {}", path.display());
            }
        }
    }

    /// First match across `sources`, tried in order. Unreadable sources are skipped.
    pub fn find_in_sources(&mut self, sources: &[PathBuf], target: &str) -> Option<SourceMatch> {
        for path in sources {
            let sheet = match self.load(path) {
                Ok(Some(sheet)) => sheet,
                Ok(None) => continue,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };
            if let Some(class_name) = match_in_sheet(&sheet, target) {
                debug!("'{}' matches .{} in {}", target, class_name, path.display());
                return Some(SourceMatch {
                    class_name: class_name.to_string(),
                    source: path.clone(),
                });
            }
        }
        None
    }

    fn load(&mut self, path: &Path) -> Result<Option<Rc<OwnedStylesheet>>, ConvertError> {
        let text = fs::read_to_string(path).map_err(|source| ConvertError::StylesheetRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(match self.cache.as_mut() {
            Some(cache) => cache.get_or_parse(path, &text),
            None => load_owned_stylesheet(path, &text).map(Rc::new),
        })
    }
}
