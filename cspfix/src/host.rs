//! Terminal hosts for the convert command.

use cspfix_lib::{ConvertError, ConvertResult, Host};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Selection handed in as text; the replacement is written to `out`.
pub struct StdioHost<W: Write> {
    selection: Option<String>,
    out: W,
}

impl<W: Write> StdioHost<W> {
    pub fn new(selection: String, out: W) -> Self {
        StdioHost {
            selection: Some(selection),
            out,
        }
    }
}

impl<W: Write> Host for StdioHost<W> {
    fn selected_text(&mut self) -> ConvertResult<Option<String>> {
        Ok(self.selection.take().filter(|text| !text.trim().is_empty()))
    }

    fn replace_selection(&mut self, text: &str) -> ConvertResult<()> {
        writeln!(self.out, "{}", text).map_err(|e| ConvertError::Selection(e.to_string()))
    }

    fn show_info(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

/// Selection is the byte range `start..end` of a file, replaced in place.
pub struct FileHost {
    path: PathBuf,
    start: usize,
    end: usize,
    // What was read, so a file edited in the meantime is not clobbered.
    selected: Option<String>,
}

impl FileHost {
    pub fn new(path: PathBuf, start: usize, end: usize) -> Self {
        FileHost {
            path,
            start,
            end,
            selected: None,
        }
    }

    fn read(&self) -> ConvertResult<String> {
        fs::read_to_string(&self.path).map_err(|e| {
            ConvertError::Selection(format!("cannot read {}: {}", self.path.display(), e))
        })
    }

    fn check_range(&self, content: &str) -> ConvertResult<()> {
        let valid = self.start <= self.end
            && self.end <= content.len()
            && content.is_char_boundary(self.start)
            && content.is_char_boundary(self.end);
        if valid {
            Ok(())
        } else {
            Err(ConvertError::Selection(format!(
                "range {}..{} is not a valid selection in {}",
                self.start,
                self.end,
                self.path.display()
            )))
        }
    }
}

impl Host for FileHost {
    fn selected_text(&mut self) -> ConvertResult<Option<String>> {
        let content = self.read()?;
        self.check_range(&content)?;
        let selected = content[self.start..self.end].to_string();
        self.selected = Some(selected.clone());
        Ok(Some(selected).filter(|text| !text.trim().is_empty()))
    }

    fn replace_selection(&mut self, text: &str) -> ConvertResult<()> {
        let content = self.read()?;
        self.check_range(&content)?;
        if self.selected.as_deref() != Some(&content[self.start..self.end]) {
            return Err(ConvertError::Selection(format!(
                "{} changed since the selection was read",
                self.path.display()
            )));
        }

        let mut updated = String::with_capacity(content.len() + text.len());
        updated.push_str(&content[..self.start]);
        updated.push_str(text);
        updated.push_str(&content[self.end..]);
        fs::write(&self.path, updated).map_err(|e| {
            ConvertError::Selection(format!("cannot write {}: {}", self.path.display(), e))
        })
    }

    fn show_info(&mut self, message: &str) {
        eprintln!("{}: {}", self.path.display(), message);
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{}: error: {}", self.path.display(), message);
    }
}
