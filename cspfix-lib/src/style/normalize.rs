//! Validation and canonical form of a declaration list.
//!
//! Declarations are wrapped in a throwaway `.dummy{...}` rule so LightningCSS can
//! parse them as a stylesheet, then printed back minified and unwrapped.

use crate::error::{ConvertError, ConvertResult};
use crate::parser::Cursor;
use lightningcss::error::{Error as LcssError, ParserError};
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use log::{debug, trace};

const WRAPPER_SELECTOR: &str = ".dummy";

/// Template tokens for the web root, degraded to a relative path.
const ROOT_PLACEHOLDERS: [&str; 2] = ["<%=root%>", "<%=root %>"];

/// Literal class emitted instead of a `display:none` declaration.
pub const HIDE_CLASS: &str = "hide";

pub fn expand_root_placeholders(text: &str) -> String {
    ROOT_PLACEHOLDERS
        .iter()
        .fold(text.to_string(), |acc, placeholder| acc.replace(placeholder, ".."))
}

fn wrap(text: &str) -> String {
    format!("{}{{{}}}", WRAPPER_SELECTOR, text)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == ';')
}

/// True if `text` is a non-empty list of plain `property:value` declarations.
pub fn is_valid_declaration_list(text: &str) -> bool {
    let wrapped = wrap(&expand_root_placeholders(text));
    let sheet = match LightningStyleSheet::parse(&wrapped, ParserOptions::default()) {
        Ok(sheet) => sheet,
        Err(e) => {
            trace!("not a declaration list ({}): {}", e, text);
            return false;
        }
    };

    let [CssRule::Style(style_rule)] = sheet.rules.0.as_slice() else {
        return false;
    };
    if !style_rule.rules.0.is_empty() {
        return false;
    }

    let block = &style_rule.declarations;
    if block.declarations.is_empty() && block.important_declarations.is_empty() {
        return false;
    }
    block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
        .all(|property| {
            property
                .value_to_css_string(PrinterOptions::default())
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false)
        })
}

/// Canonical minified form of a declaration list, e.g. `color: red ;` -> `color:red`.
///
/// Only whitespace, comments and empty declarations are dropped; declarations are
/// never merged or reordered beyond `!important` ones printing last.
pub fn normalize(text: &str) -> ConvertResult<String> {
    let expanded = expand_root_placeholders(text);
    if is_blank(&expanded) {
        return Ok(String::new());
    }

    let wrapped = wrap(&expanded);
    let sheet = LightningStyleSheet::parse(&wrapped, ParserOptions::default()).map_err(
        |e: LcssError<ParserError<'_>>| {
            debug!("normalize failed to parse {}: {}", text, e);
            ConvertError::invalid_declaration(text)
        },
    )?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| {
            debug!("normalize failed to print {}: {}", text, e);
            ConvertError::invalid_declaration(text)
        })?;

    Ok(strip_wrapper(&printed.code))
}

fn strip_wrapper(code: &str) -> String {
    let code = code.trim();
    match (code.find('{'), code.rfind('}')) {
        (Some(open), Some(close)) if open < close => code[open + 1..close].trim().to_string(),
        _ => String::new(),
    }
}

/// True if a canonical declaration list is nothing but `display:none`.
pub fn is_display_none(canonical: &str) -> bool {
    let trimmed = canonical.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    trimmed.eq_ignore_ascii_case("display:none")
}

/// True if any `display:none` declaration appears in `text`.
pub fn contains_display_none(text: &str) -> bool {
    declaration_starts(text).any(|start| match_display_none(text, start).is_some())
}

/// Remove every `display:none` declaration (and its separator), then any trailing `;`.
pub fn strip_display_none(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut copied_up_to = 0;
    let mut skip_until = 0;

    for start in declaration_starts(text) {
        if start < skip_until {
            continue;
        }
        if let Some(end) = match_display_none(text, start) {
            stripped.push_str(&text[copied_up_to..start]);
            copied_up_to = end;
            skip_until = end;
        }
    }
    stripped.push_str(&text[copied_up_to..]);

    let trimmed = stripped.trim_end();
    trimmed.strip_suffix(';').unwrap_or(trimmed).trim().to_string()
}

/// Offsets where a property name could begin: text start, or after `;` or whitespace.
fn declaration_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut previous: Option<char> = None;
    text.char_indices().filter_map(move |(idx, ch)| {
        let boundary = previous.map_or(true, |p| p == ';' || p.is_whitespace());
        previous = Some(ch);
        (boundary && (ch == 'd' || ch == 'D')).then_some(idx)
    })
}

/// Match `display : none [!important] [;]` at `start`, returning the end offset
/// including trailing whitespace. The value has to end there; `display:none-ish` is
/// not a match.
fn match_display_none(text: &str, start: usize) -> Option<usize> {
    let mut cursor = Cursor::new(text, start);
    if !cursor.eat_ignore_case("display") {
        return None;
    }
    cursor.skip_whitespace();
    if !cursor.eat(":") {
        return None;
    }
    cursor.skip_whitespace();
    if !cursor.eat_ignore_case("none") {
        return None;
    }
    cursor.skip_whitespace();
    if cursor.eat("!") {
        cursor.skip_whitespace();
        if !cursor.eat_ignore_case("important") {
            return None;
        }
        cursor.skip_whitespace();
    }
    if !cursor.eat(";") && !cursor.at_end() {
        return None;
    }
    cursor.skip_whitespace();
    Some(cursor.pos())
}
