//! Turns one selected fragment into class references.
//!
//! The pipeline is extract -> resolve quoting -> strip `display:none` -> normalize
//! -> match or synthesize -> build replacement. Any error ends the conversion and
//! nothing is handed back for the selection.

use crate::config::Workspace;
use crate::error::{ConvertError, ConvertResult};
use crate::model::style_model::{ClassRule, ConditionalBlock, FragmentForm};
use crate::parser::parse_fragment;
use crate::style::cache::StylesheetCache;
use crate::style::css_matcher::StylesheetMatcher;
use crate::style::normalize::{self, HIDE_CLASS};
use crate::synthesizer::ClassSynthesizer;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Outcome of converting one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Text that replaces the selection. Empty means "remove the attribute".
    pub replacement: String,
    /// Classes for the unconditional declarations, e.g. `hide cspfix_00000001`.
    pub class_list: Option<String>,
    /// One rendered `<c:if>` per surviving conditional block.
    pub conditional_classes: Vec<String>,
    /// Rules appended to the generated sheet during this conversion.
    pub created_rules: Vec<ClassRule>,
}

impl Conversion {
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = self.class_list.iter().map(String::as_str).collect();
        parts.extend(self.conditional_classes.iter().map(String::as_str));
        if parts.is_empty() {
            "style removed".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Classes resolved for one declaration list.
#[derive(Debug, Default)]
struct Resolved {
    hide: bool,
    class_name: Option<String>,
}

impl Resolved {
    fn class_list(&self) -> Option<String> {
        match (self.hide, &self.class_name) {
            (true, Some(name)) => Some(format!("{} {}", HIDE_CLASS, name)),
            (true, None) => Some(HIDE_CLASS.to_string()),
            (false, Some(name)) => Some(name.clone()),
            (false, None) => None,
        }
    }
}

pub struct Converter<R: Rng = StdRng> {
    workspace: Workspace,
    matcher: StylesheetMatcher,
    synthesizer: ClassSynthesizer<R>,
}

impl Converter<StdRng> {
    /// Cached matcher, entropy-seeded names.
    pub fn new(workspace: Workspace) -> Self {
        let synthesizer = ClassSynthesizer::from_entropy(workspace.config().class_prefix.clone());
        Converter {
            workspace,
            matcher: StylesheetMatcher::with_cache(StylesheetCache::new()),
            synthesizer,
        }
    }
}

impl<R: Rng> Converter<R> {
    pub fn with_rng(workspace: Workspace, rng: R) -> Self {
        let synthesizer = ClassSynthesizer::new(rng, workspace.config().class_prefix.clone());
        Converter {
            workspace,
            matcher: StylesheetMatcher::with_cache(StylesheetCache::new()),
            synthesizer,
        }
    }

    /// Swap in a differently configured matcher, e.g. one without a cache.
    pub fn with_matcher(mut self, matcher: StylesheetMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn matcher(&self) -> &StylesheetMatcher {
        &self.matcher
    }

    pub fn convert(&mut self, text: &str) -> ConvertResult<Conversion> {
        let fragment = parse_fragment(text)?;
        debug!(
            "fragment form {:?}, {} conditional block(s)",
            fragment.form,
            fragment.conditional_blocks.len()
        );

        let mut created_rules = Vec::new();
        let primary = self.resolve(&fragment.styles, &mut created_rules)?;

        let mut conditional_classes = Vec::new();
        for block in &fragment.conditional_blocks {
            if let Some(rendered) = self.resolve_block(block, &mut created_rules)? {
                conditional_classes.push(rendered);
            }
        }

        let class_list = primary.class_list();
        let replacement = build_replacement(fragment.form, class_list.as_deref(), &conditional_classes);
        Ok(Conversion {
            replacement,
            class_list,
            conditional_classes,
            created_rules,
        })
    }

    /// Classes for one declaration list: `hide` for `display:none`, plus an existing
    /// or newly generated class for everything else.
    fn resolve(&mut self, css: &str, created: &mut Vec<ClassRule>) -> ConvertResult<Resolved> {
        let mut hide = normalize::contains_display_none(css);
        let residual = normalize::strip_display_none(css);
        if !residual.is_empty() && !normalize::is_valid_declaration_list(&residual) {
            return Err(ConvertError::invalid_declaration(css.trim()));
        }

        // Comments can hide a declaration boundary in the raw text; the canonical
        // form has none, so scan it again.
        let mut canonical = normalize::normalize(&residual)?;
        if normalize::contains_display_none(&canonical) {
            hide = true;
            canonical = normalize::strip_display_none(&canonical);
        }
        if canonical.is_empty() {
            return Ok(Resolved { hide, class_name: None });
        }
        if normalize::is_display_none(&canonical) {
            return Ok(Resolved { hide: true, class_name: None });
        }
        debug!("canonical declarations: {}", canonical);

        let sources = self.workspace.source_paths();
        if let Some(found) = self.matcher.find_in_sources(&sources, &canonical) {
            return Ok(Resolved {
                hide,
                class_name: Some(found.class_name),
            });
        }

        let sink = self.workspace.sink_path();
        let rule = self.synthesizer.synthesize(&sources, &sink, &canonical)?;
        self.matcher.invalidate(&sink);
        let class_name = rule.name.clone();
        created.push(rule);
        Ok(Resolved {
            hide,
            class_name: Some(class_name),
        })
    }

    /// A block with no usable declarations disappears from the output entirely.
    fn resolve_block(
        &mut self,
        block: &ConditionalBlock,
        created: &mut Vec<ClassRule>,
    ) -> ConvertResult<Option<String>> {
        match self.resolve(&block.css, created) {
            Ok(resolved) => Ok(resolved.class_list().map(|classes| block.wrap(&classes))),
            Err(ConvertError::InvalidDeclaration { text }) => {
                warn!("dropping <c:if test={}>: not a declaration list: {}", block.condition, text);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// `class="..."` for attribute selections, bare tokens otherwise. Nothing resolved
/// at all means the attribute is removed.
fn build_replacement(form: FragmentForm, class_list: Option<&str>, conditional: &[String]) -> String {
    let mut parts: Vec<&str> = class_list.into_iter().collect();
    parts.extend(conditional.iter().map(String::as_str));
    if parts.is_empty() {
        return String::new();
    }

    let body = parts.join(" ");
    match form {
        FragmentForm::Attribute(quote) => format!("class={q}{}{q}", body, q = quote.as_str()),
        FragmentForm::Bare => body,
    }
}
