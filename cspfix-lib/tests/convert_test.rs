use cspfix_lib::synthesizer::ClassSynthesizer;
use cspfix_lib::{Config, ConvertError, Converter, Workspace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[cfg(test)]
pub mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEED: u64 = 2024;

    pub struct TestWorkspace {
        _dir: TempDir,
        workspace: Workspace,
    }

    impl TestWorkspace {
        pub fn converter(&self) -> Converter<StdRng> {
            Converter::with_rng(self.workspace.clone(), StdRng::seed_from_u64(SEED))
        }

        pub fn path(&self, relative: &str) -> PathBuf {
            self.workspace.resolve(relative)
        }

        pub fn sink(&self) -> Option<String> {
            fs::read_to_string(self.workspace.sink_path()).ok()
        }
    }

    /// Two hand-authored sheets plus the generated one, all under `css/`.
    /// `None` leaves a file missing.
    pub fn create_test_workspace(
        main: Option<&str>,
        vendors: Option<&str>,
        generated: Option<&str>,
    ) -> TestWorkspace {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        let config = Config {
            source_css_files: vec!["/css/main.css".to_string(), "/css/vendors.css".to_string()],
            generated_css_file: "/css/cspfix.css".to_string(),
            class_prefix: "cspfix".to_string(),
        };
        let workspace = Workspace::new(dir.path(), config);
        for (relative, content) in [
            ("/css/main.css", main),
            ("/css/vendors.css", vendors),
            ("/css/cspfix.css", generated),
        ] {
            if let Some(content) = content {
                fs::write(workspace.resolve(relative), content).unwrap();
            }
        }
        TestWorkspace {
            _dir: dir,
            workspace,
        }
    }

    fn assert_generated_name(name: &str) {
        let digits = name.strip_prefix("cspfix_").expect(name);
        assert_eq!(digits.len(), 8, "{}", name);
        assert!(digits.bytes().all(|b| b.is_ascii_digit()), "{}", name);
    }

    #[test]
    fn test_attribute_with_display_none_synthesizes() {
        let ws = create_test_workspace(Some(".other{margin:0}"), Some(""), Some(""));

        let conversion = ws
            .converter()
            .convert(r#"style="color:red;display:none;""#)
            .unwrap();

        assert_eq!(conversion.created_rules.len(), 1);
        let rule = &conversion.created_rules[0];
        assert_generated_name(&rule.name);
        assert_eq!(rule.declarations, "color:red");
        assert_eq!(conversion.replacement, format!("class=\"hide {}\"", rule.name));
        assert_eq!(ws.sink().unwrap(), format!("\n.{}{{color:red}}", rule.name));
    }

    #[test]
    fn test_bare_declaration_matches_existing_class() {
        let ws = create_test_workspace(Some(".foo{color:red}"), None, None);

        let conversion = ws.converter().convert("color:red").unwrap();

        assert_eq!(conversion.replacement, "foo");
        assert!(conversion.created_rules.is_empty());
        assert_eq!(ws.sink(), None);
        assert_eq!(fs::read_to_string(ws.path("/css/main.css")).unwrap(), ".foo{color:red}");
    }

    #[test]
    fn test_display_none_only_attribute() {
        let ws = create_test_workspace(Some(""), Some(""), None);

        let conversion = ws.converter().convert(r#"style="display:none""#).unwrap();

        assert_eq!(conversion.replacement, r#"class="hide""#);
        assert!(conversion.created_rules.is_empty());
        assert_eq!(ws.sink(), None);
    }

    #[test]
    fn test_conditional_block_inside_attribute() {
        let ws = create_test_workspace(Some(""), Some(".bar{color:red}"), Some(""));

        let conversion = ws
            .converter()
            .convert(r#"style="color:red;<c:if test="x">color:blue</c:if>""#)
            .unwrap();

        assert_eq!(conversion.created_rules.len(), 1);
        let rule = &conversion.created_rules[0];
        assert_eq!(
            conversion.replacement,
            format!(r#"class="bar <c:if test="x">{}</c:if>""#, rule.name)
        );
        assert_eq!(ws.sink().unwrap(), format!("\n{}", rule));
    }

    #[test]
    fn test_conditional_block_with_bare_declarations() {
        let ws = create_test_workspace(Some(""), Some(".bar{color:red}"), Some(""));

        let conversion = ws
            .converter()
            .convert(r#"color:red;<c:if test="x">color:blue</c:if>"#)
            .unwrap();

        let rule = &conversion.created_rules[0];
        assert_eq!(conversion.created_rules.len(), 1);
        assert_eq!(
            conversion.replacement,
            format!(r#"bar <c:if test="x">{}</c:if>"#, rule.name)
        );
    }

    #[test]
    fn test_missing_colon_is_rejected_without_side_effects() {
        let ws = create_test_workspace(None, None, None);

        let err = ws.converter().convert("margin 10px").unwrap_err();

        assert!(matches!(err, ConvertError::InvalidDeclaration { .. }));
        assert_eq!(ws.sink(), None);
    }

    #[test]
    fn test_invalid_attribute_value_is_rejected() {
        let ws = create_test_workspace(None, None, Some(""));

        let err = ws.converter().convert(r#"style="margin 10px""#).unwrap_err();

        assert!(matches!(err, ConvertError::InvalidDeclaration { .. }));
        assert_eq!(ws.sink().unwrap(), "");
    }

    #[test]
    fn test_converted_output_is_not_converted_again() {
        let ws = create_test_workspace(None, None, Some(""));

        let err = ws.converter().convert(r#"class="cspfix_00000001""#).unwrap_err();

        assert!(matches!(err, ConvertError::InvalidDeclaration { .. }));
        assert_eq!(ws.sink().unwrap(), "");
    }

    #[test]
    fn test_same_style_twice_creates_one_rule() {
        let ws = create_test_workspace(Some(""), Some(""), Some(""));
        let mut converter = ws.converter();

        let first = converter.convert(r#"style="margin:0 auto""#).unwrap();
        let second = converter.convert("margin: 0 auto;").unwrap();
        // A fresh converter starts with an empty cache and the same seed.
        let third = ws.converter().convert("margin:0 auto").unwrap();

        let name = first.created_rules[0].name.clone();
        assert_eq!(second.replacement, name);
        assert_eq!(third.replacement, name);
        assert!(second.created_rules.is_empty());
        assert!(third.created_rules.is_empty());
        assert_eq!(ws.sink().unwrap().matches("cspfix_").count(), 1);
    }

    #[test]
    fn test_previously_generated_rule_is_reused() {
        let ws = create_test_workspace(None, None, Some("\n.cspfix_12345678{padding:4px 8px}"));

        let conversion = ws.converter().convert("padding: 4px 8px").unwrap();

        assert_eq!(conversion.replacement, "cspfix_12345678");
        assert!(conversion.created_rules.is_empty());
    }

    #[test]
    fn test_sources_are_searched_in_order() {
        let ws = create_test_workspace(
            Some(".from_main{margin:0}"),
            Some(".from_vendors{margin:0}"),
            Some("\n.cspfix_00000001{margin:0}"),
        );

        assert_eq!(ws.converter().convert("margin:0").unwrap().replacement, "from_main");
    }

    #[test]
    fn test_unreadable_sources_are_skipped() {
        let ws = create_test_workspace(None, None, Some("\n.cspfix_00000001{margin:0}"));

        assert_eq!(ws.converter().convert("margin:0").unwrap().replacement, "cspfix_00000001");
    }

    #[test]
    fn test_important_in_source_still_matches() {
        let ws = create_test_workspace(Some(".imp{margin:0 !important}"), None, None);

        assert_eq!(ws.converter().convert("margin: 0").unwrap().replacement, "imp");
    }

    #[test]
    fn test_generated_name_avoids_names_in_sources() {
        let first_draw = ClassSynthesizer::new(StdRng::seed_from_u64(SEED), "cspfix")
            .generate_against(&[])
            .unwrap();
        let main = format!("/* reserved: {} */", first_draw);
        let ws = create_test_workspace(Some(&main), Some(""), Some(""));

        let conversion = ws.converter().convert("margin:3px").unwrap();

        let name = &conversion.created_rules[0].name;
        assert_ne!(name, &first_draw);
        assert!(!main.contains(name.as_str()));
    }

    #[test]
    fn test_display_none_variants() {
        let ws = create_test_workspace(Some(""), Some(""), None);
        let mut converter = ws.converter();

        for text in ["display:none", "display: none ;", "DISPLAY:NONE", "display:none !important"] {
            let conversion = converter.convert(text).unwrap();
            assert_eq!(conversion.replacement, "hide", "{}", text);
        }
        assert_eq!(ws.sink(), None);
    }

    #[test]
    fn test_display_none_after_comment_is_not_merged() {
        let ws = create_test_workspace(Some(""), Some(""), Some(""));

        let conversion = ws
            .converter()
            .convert(r#"style="color:red;/* hidden */display:none""#)
            .unwrap();

        assert_eq!(conversion.created_rules.len(), 1);
        let rule = &conversion.created_rules[0];
        assert_eq!(rule.declarations, "color:red");
        assert_eq!(conversion.replacement, format!("class=\"hide {}\"", rule.name));
        assert!(!ws.sink().unwrap().contains("display"));
    }

    #[test]
    fn test_display_none_between_comments_only_hides() {
        let ws = create_test_workspace(Some(""), Some(""), None);

        let conversion = ws.converter().convert("/* a */display:none/* b */").unwrap();

        assert_eq!(conversion.replacement, "hide");
        assert!(conversion.created_rules.is_empty());
        assert_eq!(ws.sink(), None);
    }

    #[test]
    fn test_conditional_display_none_only() {
        let ws = create_test_workspace(Some(""), Some(""), None);

        let conversion = ws
            .converter()
            .convert(r#"style="<c:if test='${closed}'>display:none</c:if>""#)
            .unwrap();

        assert_eq!(
            conversion.replacement,
            r#"class="<c:if test='${closed}'>hide</c:if>""#
        );
        assert_eq!(ws.sink(), None);
    }

    #[test]
    fn test_unusable_conditional_blocks_are_dropped() {
        let ws = create_test_workspace(Some(".foo{color:red}"), None, None);

        let conversion = ws
            .converter()
            .convert(r#"style="color:red;<c:if test="a">margin 10px</c:if><c:if test="b"> </c:if>""#)
            .unwrap();

        assert_eq!(conversion.replacement, r#"class="foo""#);
        assert!(conversion.conditional_classes.is_empty());
    }

    #[test]
    fn test_empty_attribute_is_removed() {
        let ws = create_test_workspace(None, None, None);

        assert_eq!(ws.converter().convert(r#"style="""#).unwrap().replacement, "");
        assert_eq!(ws.converter().convert("style=';'").unwrap().replacement, "");
    }

    #[test]
    fn test_single_and_escaped_quotes_are_kept() {
        let ws = create_test_workspace(Some(".foo{color:red}"), None, None);
        let mut converter = ws.converter();

        assert_eq!(converter.convert("style='color:red'").unwrap().replacement, "class='foo'");
        assert_eq!(
            converter.convert(r#"style=\"color:red\""#).unwrap().replacement,
            r#"class=\"foo\""#
        );
    }

    #[test]
    fn test_root_placeholder_is_relative_in_generated_rule() {
        let ws = create_test_workspace(Some(""), Some(""), Some(""));

        let conversion = ws
            .converter()
            .convert(r#"style="background-image:url('<%=root%>/images/bg.png')""#)
            .unwrap();

        let sink = ws.sink().unwrap();
        assert!(sink.contains("../images/bg.png"), "{}", sink);
        assert!(!sink.contains("<%"));
        assert_eq!(conversion.created_rules.len(), 1);
    }

    #[test]
    fn test_unwritable_sink_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            source_css_files: vec![],
            generated_css_file: "/missing_dir/cspfix.css".to_string(),
            class_prefix: "cspfix".to_string(),
        };
        let mut converter =
            Converter::with_rng(Workspace::new(dir.path(), config), StdRng::seed_from_u64(SEED));

        let err = converter.convert("color:red").unwrap_err();

        assert!(matches!(err, ConvertError::SinkWrite { .. }));
    }
}
