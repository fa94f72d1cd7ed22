use super::Cursor;
use crate::model::style_model::QuoteStyle;

const PLAIN_QUOTES: [(&str, QuoteStyle); 2] =
    [("\"", QuoteStyle::Double), ("'", QuoteStyle::Single)];
const ESCAPED_QUOTES: [(&str, QuoteStyle); 2] = [
    ("\\\"", QuoteStyle::EscapedDouble),
    ("\\'", QuoteStyle::EscapedSingle),
];

/// A `style=` attribute found in the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleAttribute {
    pub quote: QuoteStyle,
    /// Attribute value between the quotes.
    pub styles: String,
}

/// Find a quoted `style=` attribute anywhere in `text`.
///
/// Plain `"`/`'` quoting anywhere in the text wins over backslash-escaped quoting.
/// The value runs to the next occurrence of the opening quote and may not span lines.
pub fn find_style_attribute(text: &str) -> Option<StyleAttribute> {
    find_quoted(text, &PLAIN_QUOTES).or_else(|| find_quoted(text, &ESCAPED_QUOTES))
}

fn find_quoted(text: &str, quotes: &[(&str, QuoteStyle)]) -> Option<StyleAttribute> {
    text.match_indices("style")
        .find_map(|(start, name)| attribute_at(text, start + name.len(), quotes))
}

fn attribute_at(text: &str, after_name: usize, quotes: &[(&str, QuoteStyle)]) -> Option<StyleAttribute> {
    let mut cursor = Cursor::new(text, after_name);
    cursor.skip_whitespace();
    if !cursor.eat("=") {
        return None;
    }
    cursor.skip_whitespace();

    let (delimiter, quote) = quotes
        .iter()
        .copied()
        .find(|(delimiter, _)| cursor.rest().starts_with(delimiter))?;
    cursor.eat(delimiter);
    let styles = cursor.take_until(delimiter)?;
    if styles.contains('\n') {
        return None;
    }

    Some(StyleAttribute {
        quote,
        styles: styles.to_string(),
    })
}
