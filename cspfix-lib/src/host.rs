//! The editor side of a conversion: where the selection comes from and goes to.

use crate::convert::{Conversion, Converter};
use crate::error::ConvertResult;
use log::debug;
use rand::Rng;

/// What the conversion needs from whoever owns the text being edited.
pub trait Host {
    /// The current selection, or `None` when there is nothing to work on.
    fn selected_text(&mut self) -> ConvertResult<Option<String>>;

    /// Replace the selection. Called at most once per command.
    fn replace_selection(&mut self, text: &str) -> ConvertResult<()>;

    fn show_info(&mut self, message: &str);

    fn show_error(&mut self, message: &str);
}

/// The "convert selected style to class" command.
///
/// The selection is replaced only when conversion succeeds; every failure is shown
/// to the user and returned.
pub fn run_command<H: Host, R: Rng>(
    host: &mut H,
    converter: &mut Converter<R>,
) -> ConvertResult<Option<Conversion>> {
    let text = match host.selected_text() {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!("nothing selected");
            return Ok(None);
        }
        Err(e) => {
            host.show_error(&e.to_string());
            return Err(e);
        }
    };

    let outcome = converter
        .convert(&text)
        .and_then(|conversion| host.replace_selection(&conversion.replacement).map(|_| conversion));

    match outcome {
        Ok(conversion) => {
            host.show_info(&format!("Style converted: {}", conversion.summary()));
            Ok(Some(conversion))
        }
        Err(e) => {
            host.show_error(&e.to_string());
            Err(e)
        }
    }
}
