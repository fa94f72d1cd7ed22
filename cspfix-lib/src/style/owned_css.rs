// src/style/owned_css.rs (owned copies of parsed rules, so they can outlive the source text)
use lightningcss::error::{Error as LcssError, ParserError, PrinterErrorKind};
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::rules::{style::StyleRule, CssRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;
use log::{debug, warn};
use std::fmt;
use std::path::Path;

// A fully-owned CSS stylesheet: top-level style rules only (@media, @font-face etc. are skipped).
#[derive(Debug, Default)]
pub struct OwnedStylesheet {
    pub rules: Vec<OwnedRule>,
}

#[derive(Debug, Clone)]
pub struct OwnedRule {
    /// e.g. ".red", "div > p"
    pub selectors: Vec<String>,
    pub declarations: Vec<OwnedDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedDeclaration {
    pub property: String,
    /// Minified value, without `!important`.
    pub value: String,
    pub important: bool,
}

impl fmt::Display for OwnedDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)?;
        if self.important {
            f.write_str("!important")?;
        }
        Ok(())
    }
}

impl OwnedRule {
    /// Declarations joined the same way `normalize` prints them.
    pub fn canonical_declarations(&self) -> String {
        self.declarations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Selectors: {:?}", self.selectors)?;
        for decl in &self.declarations {
            writeln!(f, "  {}", decl)?;
        }
        Ok(())
    }
}

/// Parse a raw CSS string (LightningCSS) and convert it to a fully-owned stylesheet.
///
/// Parsing recovers from bad rules and declarations, so one vendor hack does not
/// hide every other rule in the file.
pub fn parse_and_own_css(css_text: &str) -> Result<OwnedStylesheet, ParserError<'_>> {
    let parser_opts = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };

    let sheet = LightningStyleSheet::parse(css_text, parser_opts)
        .map_err(|e: LcssError<ParserError<'_>>| e.kind)?;

    let mut owned_rules = Vec::new();
    for rule in &sheet.rules.0 {
        // Rules inside @media and friends are not interchangeable with a plain class.
        if let CssRule::Style(style_rule) = rule {
            match convert_style_rule(style_rule) {
                Ok(owned) => owned_rules.push(owned),
                Err(e) => debug!("skipping rule with unprintable declarations: {}", e),
            }
        }
    }

    Ok(OwnedStylesheet { rules: owned_rules })
}

/// Parse one stylesheet file's text, logging instead of failing.
pub fn load_owned_stylesheet(path: &Path, css_text: &str) -> Option<OwnedStylesheet> {
    match parse_and_own_css(css_text) {
        Ok(sheet) => {
            debug!("parsed {} ({} style rules)", path.display(), sheet.rules.len());
            Some(sheet)
        }
        Err(e) => {
            warn!("CSS parse error in {}: {}", path.display(), e);
            None
        }
    }
}

/// Helper to copy a single StyleRule's selectors + declarations into OwnedRule.
fn convert_style_rule(style_rule: &StyleRule<'_>) -> Result<OwnedRule, LcssError<PrinterErrorKind>> {
    let mut selectors_vec = Vec::new();
    for selector in &style_rule.selectors.0 {
        if let Ok(sel_str) = selector.to_css_string(Default::default()) {
            selectors_vec.push(sel_str);
        }
    }

    let block = &style_rule.declarations;
    let mut decls_vec = Vec::new();

    // Normal declarations first, then !important ones, matching the printer.
    for property in &block.declarations {
        decls_vec.push(convert_property(property, false)?);
    }
    for property in &block.important_declarations {
        decls_vec.push(convert_property(property, true)?);
    }

    Ok(OwnedRule {
        selectors: selectors_vec,
        declarations: decls_vec,
    })
}

fn convert_property(
    property: &Property<'_>,
    important: bool,
) -> Result<OwnedDeclaration, LcssError<PrinterErrorKind>> {
    let printed = property.to_css_string(
        false,
        PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        },
    )?;
    // The printed name carries any vendor prefix, which `property_id().name()` drops.
    let (name, value) = printed.split_once(':').unwrap_or((printed.as_str(), ""));
    Ok(OwnedDeclaration {
        property: name.to_string(),
        value: value.to_string(),
        important,
    })
}
