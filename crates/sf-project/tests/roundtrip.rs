use sf_project::schema::*;
use sf_project::{load_json, load_yaml, save_json, save_yaml, validate_system};

fn feedback_def() -> SystemDef {
    SystemDef {
        version: 1,
        name: "Feedback".to_string(),
        inputs: 1,
        outputs: 1,
        sample_rate_hz: Some(100.0),
        options: OptionsDef {
            tick_budget_s: Some(0.01),
            output_hold: OutputHoldDef::Fresh,
        },
        blocks: vec![
            BlockDef {
                id: "sum".to_string(),
                label: Some("error".to_string()),
                kind: BlockKindDef::Junction {
                    signs: "+-".to_string(),
                },
            },
            BlockDef {
                id: "lag".to_string(),
                label: None,
                kind: BlockKindDef::Filter {
                    num: vec![1.0],
                    den: vec![1.0, 1.0],
                    sample_rate_hz: 100.0,
                    method: "gbt:0.5".to_string(),
                },
            },
        ],
        edges: vec![
            EdgeDef {
                from: "input".to_string(),
                from_port: 0,
                to: "sum".to_string(),
                to_port: 0,
            },
            EdgeDef {
                from: "sum".to_string(),
                from_port: 0,
                to: "lag".to_string(),
                to_port: 0,
            },
            EdgeDef {
                from: "lag".to_string(),
                from_port: 0,
                to: "sum".to_string(),
                to_port: 1,
            },
            EdgeDef {
                from: "lag".to_string(),
                from_port: 0,
                to: "output".to_string(),
                to_port: 0,
            },
        ],
    }
}

#[test]
fn roundtrip_yaml() {
    let def = feedback_def();
    validate_system(&def).unwrap();

    let path = std::env::temp_dir().join("sf_project_roundtrip.yaml");
    save_yaml(&path, &def).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(def, loaded);
}

#[test]
fn roundtrip_json() {
    let def = feedback_def();

    let path = std::env::temp_dir().join("sf_project_roundtrip.json");
    save_json(&path, &def).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(def, loaded);
}

#[test]
fn defaults_fill_missing_fields() {
    let yaml = r#"
version: 0
name: Minimal
blocks:
  - id: j
    kind:
      type: Junction
edges: []
"#;
    let def = sf_project::parse_yaml(yaml).unwrap();
    assert_eq!(def.version, sf_project::LATEST_VERSION);
    assert_eq!(def.inputs, 0);
    assert_eq!(def.options, OptionsDef::default());
    assert_eq!(
        def.blocks[0].kind,
        BlockKindDef::Junction {
            signs: "++".to_string()
        }
    );
}

#[test]
fn invalid_file_is_rejected_on_save() {
    let mut def = feedback_def();
    def.edges[0].to = "missing".to_string();
    let path = std::env::temp_dir().join("sf_project_invalid.yaml");
    assert!(matches!(
        save_yaml(&path, &def),
        Err(sf_project::ProjectError::Validation(_))
    ));
}
