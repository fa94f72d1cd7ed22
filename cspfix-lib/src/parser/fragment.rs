//! Pulls `<c:if test="...">...</c:if>` blocks out of a selected fragment.

use super::Cursor;
use crate::model::style_model::ConditionalBlock;

const OPEN_TAG: &str = "<c:if";
const CLOSE_TAG: &str = "</c:if>";

/// Text left after removing conditional blocks, plus the blocks in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub css_text: String,
    pub conditional_blocks: Vec<ConditionalBlock>,
}

/// Scan `text` left to right, lifting out every complete conditional block.
///
/// Text between blocks is concatenated into `css_text`. An opening tag that never
/// forms a complete block is left in place as literal text.
pub fn extract(text: &str) -> ExtractedText {
    let mut css_text = String::with_capacity(text.len());
    let mut conditional_blocks = Vec::new();
    let mut copied_up_to = 0;
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(OPEN_TAG) {
        let start = search_from + offset;
        match parse_block(text, start) {
            Some((block, end)) => {
                css_text.push_str(&text[copied_up_to..start]);
                conditional_blocks.push(block);
                copied_up_to = end;
                search_from = end;
            }
            None => search_from = start + OPEN_TAG.len(),
        }
    }
    css_text.push_str(&text[copied_up_to..]);

    ExtractedText {
        css_text: tidy_separators(css_text.trim()),
        conditional_blocks,
    }
}

/// Parse one block starting at `start` (which points at `<c:if`).
/// Returns the block and the byte offset just past `</c:if>`.
fn parse_block(text: &str, start: usize) -> Option<(ConditionalBlock, usize)> {
    let mut cursor = Cursor::new(text, start);
    if !cursor.eat(OPEN_TAG) || cursor.skip_whitespace() == 0 {
        return None;
    }
    if !cursor.eat("test") {
        return None;
    }
    cursor.skip_whitespace();
    if !cursor.eat("=") {
        return None;
    }
    cursor.skip_whitespace();

    let quote = cursor.eat_any(&['"', '\''])?;
    let mut delimiter = [0u8; 4];
    let condition = cursor.take_until(quote.encode_utf8(&mut delimiter))?;
    cursor.skip_whitespace();
    if !cursor.eat(">") {
        return None;
    }
    let inner = cursor.take_until(CLOSE_TAG)?;

    let block = ConditionalBlock {
        condition: condition.to_string(),
        condition_quote: quote,
        css: inner.trim().to_string(),
    };
    Some((block, cursor.pos()))
}

/// Collapse runs of `;` and drop one leading and one trailing `;`.
fn tidy_separators(text: &str) -> String {
    let mut tidy = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == ';' && tidy.ends_with(';') {
            continue;
        }
        tidy.push(ch);
    }
    let trimmed = tidy.strip_prefix(';').unwrap_or(tidy.as_str());
    trimmed.strip_suffix(';').unwrap_or(trimmed).to_string()
}
