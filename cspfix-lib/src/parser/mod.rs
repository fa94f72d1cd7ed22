//! Lexers that take a selected markup fragment apart.
//!
//! `fragment` pulls the `<c:if>` blocks out of the selection, `style_attr` finds a
//! quoted `style=` attribute in what is left. Both work on a small [`Cursor`]
//! instead of regular expressions so each edge case is a visible branch.

pub mod fragment;
pub mod style_attr;

use crate::error::{ConvertError, ConvertResult};
use crate::model::style_model::{FragmentForm, StyleFragment};
use crate::style::normalize;
use log::debug;

/// Split a selection into residual style text, quoting form and conditional blocks.
///
/// Fails with `InvalidDeclaration` when the text is neither a quoted style attribute
/// nor a valid bare declaration list.
pub fn parse_fragment(text: &str) -> ConvertResult<StyleFragment> {
    let extracted = fragment::extract(text);
    let css_text = extracted.css_text.trim();

    let (form, styles) = match style_attr::find_style_attribute(css_text) {
        Some(attribute) => {
            debug!("style attribute found, quote {:?}", attribute.quote);
            (FragmentForm::Attribute(attribute.quote), attribute.styles)
        }
        None if normalize::is_valid_declaration_list(css_text) => {
            (FragmentForm::Bare, css_text.to_string())
        }
        // Blocks alone still carry declarations, the residual is just empty.
        None if css_text.is_empty() && !extracted.conditional_blocks.is_empty() => {
            (FragmentForm::Bare, String::new())
        }
        None => return Err(ConvertError::invalid_declaration(text.trim())),
    };

    Ok(StyleFragment {
        original: text.to_string(),
        form,
        styles,
        conditional_blocks: extracted.conditional_blocks,
    })
}

/// Byte cursor over ASCII-delimited text.
///
/// Every token it matches is ASCII, so `pos` always sits on a char boundary.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str, pos: usize) -> Self {
        Cursor { text, pos }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_ignore_case(&mut self, token: &str) -> bool {
        let rest = self.rest().as_bytes();
        if rest.len() >= token.len() && rest[..token.len()].eq_ignore_ascii_case(token.as_bytes()) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Consume one of `choices`, returning it.
    pub(crate) fn eat_any(&mut self, choices: &[char]) -> Option<char> {
        let ch = self.rest().chars().next()?;
        if choices.contains(&ch) {
            self.pos += ch.len_utf8();
            Some(ch)
        } else {
            None
        }
    }

    /// Returns the number of bytes skipped.
    pub(crate) fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while let Some(ch) = self.rest().chars().next() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
        self.pos - start
    }

    /// Consume up to and including `delimiter`, returning what came before it.
    pub(crate) fn take_until(&mut self, delimiter: &str) -> Option<&'a str> {
        let rest = self.rest();
        let idx = rest.find(delimiter)?;
        self.pos += idx + delimiter.len();
        Some(&rest[..idx])
    }
}
