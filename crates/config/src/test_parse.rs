#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn builtin_config_parses() {
        let cfg = builtin();
        assert_eq!(cfg.groups.len(), 7);
        assert_eq!(cfg.groups[1].title, "Station Tête");
        assert_eq!(cfg.groups[1].dom_id(), "Station_T_te");
        assert_eq!(cfg.utilities.len(), 4);
        assert!(cfg.utilities[1].has_submenu());
        assert_eq!(cfg.anchors.menu, ".header-pane");
        assert!(!cfg.presets.is_empty());
    }

    #[test]
    fn every_builtin_target_is_an_allowed_view() {
        let cfg = builtin();
        for target in cfg.navigation_targets() {
            assert!(cfg.is_allowed_view(target), "{target} not in allow-list");
        }
    }

    #[test]
    fn allow_list_is_prefix_and_case_sensitive() {
        let cfg = builtin();
        assert!(cfg.is_allowed_view("#/Displays/305/Vue-Globale-Pipeline"));
        assert!(cfg.is_allowed_view("#/Displays/305/Vue-Globale-Pipeline?mode=kiosk"));
        assert!(!cfg.is_allowed_view("#/Displays/305/vue-globale-pipeline"));
        assert!(!cfg.is_allowed_view("#/Displays/99999/Unknown-View"));
        assert!(!cfg.is_allowed_view(""));
    }

    #[test]
    fn item_variant_follows_populated_fields() {
        let ron = r##"(
            groups: [(
                title: "G",
                items: [
                    (text: "Nav", icon: "fa-a", hash: "#/x"),
                    (text: "Ext", icon: "fa-b", url: "https://example.com"),
                    (text: "Sub", icon: "fa-c", children: [(text: "Leaf", hash: "#/y")]),
                    (text: "Both", url: "https://wins.example", hash: "#/loses"),
                ],
            )],
        )"##;
        let cfg = load_from_str(ron, None).unwrap();
        let items = &cfg.groups[0].items;
        assert!(matches!(&items[0], MenuItem::Navigation { target, .. } if target == "#/x"));
        assert!(matches!(&items[1], MenuItem::External { url, .. } if url == "https://example.com"));
        assert!(matches!(&items[2], MenuItem::Submenu { children, .. } if children.len() == 1));
        assert!(matches!(&items[3], MenuItem::External { url, .. } if url == "https://wins.example"));
    }

    #[test]
    fn empty_children_fall_back_to_hash() {
        let ron = r##"(groups: [(title: "G", items: [(text: "N", hash: "#/n", children: [])])])"##;
        let cfg = load_from_str(ron, None).unwrap();
        assert!(matches!(&cfg.groups[0].items[0], MenuItem::Navigation { .. }));
    }

    #[test]
    fn item_without_target_fails_validation() {
        let ron = r#"(groups: [(title: "G", items: [(text: "Nowhere")])])"#;
        match load_from_str(ron, None) {
            Err(Error::Validation { message, .. }) => assert!(message.contains("G > Nowhere")),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn colliding_group_ids_fail_validation() {
        let ron = r##"(groups: [
            (title: "A B", items: []),
            (title: "A-B", items: []),
        ])"##;
        assert!(matches!(
            load_from_str(ron, None),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn unknown_field_is_a_parse_error_with_location() {
        let ron = "(\n  groupz: [],\n)";
        match load_from_str(ron, None) {
            Err(Error::Parse { line, excerpt, .. }) => {
                assert!((1..=3).contains(&line));
                assert!(excerpt.contains("groupz"));
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn utility_actions_parse_known_and_unknown_ids() {
        let ron = r#"(utilities: [
            (text: "Hide", icon: "fa-eye-slash", action: "hide-navbar"),
            (text: "Later", action: "not-yet-built"),
            (text: "Full", submenu: [(text: "All", action: "set-fullscreen-mode", mode: "hide-all")]),
        ])"#;
        let cfg = load_from_str(ron, None).unwrap();
        assert_eq!(cfg.utilities[0].action, Some(ActionKind::HideNavbar));
        assert_eq!(
            cfg.utilities[1].action,
            Some(ActionKind::Unknown("not-yet-built".into()))
        );
        assert_eq!(cfg.utilities[2].action, None);
        assert_eq!(cfg.utilities[2].submenu[0].mode, Some(FullscreenMode::HideAll));
    }

    #[test]
    fn omitted_anchors_keep_defaults() {
        let cfg = load_from_str(r##"(anchors: (menu: "#top"))"##, None).unwrap();
        assert_eq!(cfg.anchors.menu, "#top");
        assert_eq!(cfg.anchors.header, Anchors::default().header);
        assert_eq!(cfg.aux_join_timeout_ms, Config::default().aux_join_timeout_ms);
    }

    #[test]
    fn gradient_presets_are_detected() {
        let cfg = builtin();
        assert!(cfg.presets.iter().any(Preset::is_gradient));
        assert!(cfg.presets.iter().any(|p| !p.is_gradient()));
        assert!(is_gradient("  linear-gradient(90deg, #000, #fff)"));
        assert!(!is_gradient("#000000"));
    }

    #[test]
    fn load_from_path_rejects_other_extensions() {
        let err = load_from_path(std::path::Path::new("/tmp/config.json")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.pretty().contains("expected a .ron file"));
    }
}
