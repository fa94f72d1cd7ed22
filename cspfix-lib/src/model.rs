use std::fmt;

pub mod style_model {
    use super::*;

    /// How the style attribute value was quoted in the selection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum QuoteStyle {
        /// Bare declaration list, no attribute around it.
        None,
        Double,
        Single,
        /// `style=\"...\"`, as found inside string literals.
        EscapedDouble,
        EscapedSingle,
    }

    impl QuoteStyle {
        pub fn as_str(&self) -> &'static str {
            match self {
                QuoteStyle::None => "",
                QuoteStyle::Double => "\"",
                QuoteStyle::Single => "'",
                QuoteStyle::EscapedDouble => "\\\"",
                QuoteStyle::EscapedSingle => "\\'",
            }
        }
    }

    /// Whether the selection was a whole `style="..."` attribute or only its value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FragmentForm {
        Attribute(QuoteStyle),
        Bare,
    }

    impl FragmentForm {
        pub fn quote(&self) -> QuoteStyle {
            match self {
                FragmentForm::Attribute(quote) => *quote,
                FragmentForm::Bare => QuoteStyle::None,
            }
        }
    }

    /// A `<c:if test="...">...</c:if>` block found in the selection.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ConditionalBlock {
        /// Test expression, kept verbatim.
        pub condition: String,
        /// Quote character that surrounded the condition.
        pub condition_quote: char,
        /// Inner style text, trimmed.
        pub css: String,
    }

    impl ConditionalBlock {
        /// Re-wrap `body` in this block's tag.
        pub fn wrap(&self, body: &str) -> String {
            format!(
                "<c:if test={q}{}{q}>{}</c:if>",
                self.condition,
                body,
                q = self.condition_quote
            )
        }
    }

    /// The selection, split into its pieces.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StyleFragment {
        pub original: String,
        pub form: FragmentForm,
        /// Declarations outside any conditional block.
        pub styles: String,
        pub conditional_blocks: Vec<ConditionalBlock>,
    }

    /// A rule persisted to a stylesheet, `.name{declarations}`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ClassRule {
        pub name: String,
        pub declarations: String,
    }

    impl fmt::Display for ClassRule {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, ".{}{{{}}}", self.name, self.declarations)
        }
    }
}
