use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sector_scout::config::load_config;
use sector_scout::dataset::{SourcePaths, Sources};
use sector_scout::query::{explain_cell, score_map, ReasonOptions};
use sector_scout::scoring::ReasonKind;
use sector_scout::{EngineError, EngineHandle, EnginePolicy, Mode, Query};

const VALUES_JSON: &str = r#"[
  { "province": "A", "values": { "x": 10, "y": 90 } },
  { "province": "B", "values": { "x": 50, "y": 50 } },
  { "province": "C", "values": { "x": 90, "y": 10 } }
]"#;

const DIRECTIONS_YAML: &str = r#"
- indicator: x
  direction: YUKSEK
- indicator: y
  direction: DUSUK
  label: Unemployment
"#;

const WEIGHTS_YAML: &str = r#"
- { sector: Even, indicator: x, weight: 0.5 }
- { sector: Even, indicator: y, weight: 0.5 }
- { sector: OnlyX, indicator: x, weight: 3 }
- { sector: OnlyX, indicator: y, weight: 0 }
"#;

const REGISTRY_YAML: &str = r#"
provinces: [A, B, C]
sectors: [Even, OnlyX]
aliases:
  Cee: C
"#;

/// Write the fixture set into its own temp directory and return the paths.
fn write_fixtures(name: &str, weights: &str) -> SourcePaths {
    let dir = env::temp_dir().join(format!("sector_scout_e2e_{}", name));
    fs::create_dir_all(&dir).unwrap();

    let paths = SourcePaths {
        values: dir.join("values.json"),
        directions: dir.join("directions.yaml"),
        weights: dir.join("weights.yaml"),
        registry: dir.join("registry.yml"),
    };
    fs::write(&paths.values, VALUES_JSON).unwrap();
    fs::write(&paths.directions, DIRECTIONS_YAML).unwrap();
    fs::write(&paths.weights, weights).unwrap();
    fs::write(&paths.registry, REGISTRY_YAML).unwrap();
    paths
}

fn ready_handle(name: &str) -> EngineHandle {
    let paths = write_fixtures(name, WEIGHTS_YAML);
    let handle = EngineHandle::new();
    handle
        .initialize_from_paths(&paths, EnginePolicy::default())
        .unwrap();
    handle
}

fn query(mode: Mode, subject: &str, top_n: usize) -> Query {
    Query {
        mode,
        subject: subject.to_string(),
        top_n,
    }
}

fn names(handle: &EngineHandle, q: &Query) -> Vec<String> {
    handle
        .query(q, &ReasonOptions::default())
        .unwrap()
        .items
        .into_iter()
        .map(|item| item.name)
        .collect()
}

#[test]
fn test_query_before_initialize_is_not_ready() {
    let handle = EngineHandle::new();
    let err = handle
        .query(&query(Mode::SectorToProvince, "Even", 3), &ReasonOptions::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::NotReady));
    assert!(!handle.is_ready());
}

#[test]
fn test_sector_to_province_top_two() {
    let handle = ready_handle("top_two");
    let response = handle
        .query(&query(Mode::SectorToProvince, "even", 2), &ReasonOptions::default())
        .unwrap();

    assert_eq!(response.subject, "Even");
    assert_eq!(response.items.len(), 2);
    assert_eq!(response.items[0].name, "C");
    assert_eq!(response.items[0].score, 100.0);
    assert_eq!(response.items[0].rank, 1);
    assert_eq!(response.items[1].name, "B");
    assert_eq!(response.items[1].score, 50.0);
}

#[test]
fn test_top_n_larger_than_population_is_capped() {
    let handle = ready_handle("capped");
    let found = names(&handle, &query(Mode::SectorToProvince, "OnlyX", 50));
    assert_eq!(found, vec!["C", "B", "A"]);
}

#[test]
fn test_province_to_sector_ties_break_by_name() {
    let handle = ready_handle("ties");
    // B scores 50 in both sectors
    let found = names(&handle, &query(Mode::ProvinceToSector, "B", 2));
    assert_eq!(found, vec!["Even", "OnlyX"]);
}

#[test]
fn test_alias_and_case_resolve() {
    let handle = ready_handle("alias");
    let response = handle
        .query(&query(Mode::ProvinceToSector, "cee", 1), &ReasonOptions::default())
        .unwrap();
    assert_eq!(response.subject, "C");
}

#[test]
fn test_invalid_arguments() {
    let handle = ready_handle("invalid");
    let opts = ReasonOptions::default();

    let err = handle
        .query(&query(Mode::SectorToProvince, "Mining", 3), &opts)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let err = handle
        .query(&query(Mode::ProvinceToSector, "Z", 3), &opts)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let err = handle
        .query(&query(Mode::SectorToProvince, "Even", 0), &opts)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    // Engine keeps serving after a rejected query
    assert_eq!(names(&handle, &query(Mode::SectorToProvince, "Even", 1)), vec!["C"]);
}

#[test]
fn test_explain_top_cell_splits_evenly() {
    let handle = ready_handle("explain");
    let engine = handle.engine().unwrap();
    let explanation = explain_cell(&engine, "C", "Even").unwrap();

    assert_eq!(explanation.score, 100.0);
    assert_eq!(explanation.attributions.len(), 2);
    for share in &explanation.attributions {
        assert!((share.share - 0.5).abs() < 1e-12);
        assert!((share.points - 50.0).abs() < 1e-12);
    }
    let total: f64 = explanation.attributions.iter().map(|a| a.share).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_zero_weighted_indicator_not_attributed() {
    let handle = ready_handle("zero_weight");
    let engine = handle.engine().unwrap();
    let explanation = explain_cell(&engine, "C", "OnlyX").unwrap();
    assert_eq!(explanation.attributions.len(), 1);
    assert_eq!(explanation.attributions[0].indicator, "x");
    assert_eq!(explanation.attributions[0].share, 1.0);
}

#[test]
fn test_reasons_carry_labels_and_risk() {
    let handle = ready_handle("reasons");
    let response = handle
        .query(
            &query(Mode::SectorToProvince, "Even", 2),
            &ReasonOptions {
                strengths: 1,
                include_risk: true,
            },
        )
        .unwrap();
    let reasons = &response.items[0].reasons;
    assert_eq!(reasons.len(), 2);
    assert_eq!(reasons[0].kind, ReasonKind::Strength);
    assert_eq!(reasons[1].kind, ReasonKind::Risk);
    assert!(reasons
        .iter()
        .any(|r| r.label.as_deref() == Some("Unemployment")));
}

#[test]
fn test_score_map_covers_every_province() {
    let handle = ready_handle("map");
    let engine = handle.engine().unwrap();
    let map = score_map(&engine, Mode::SectorToProvince, "OnlyX").unwrap();
    assert_eq!(
        map.scores,
        vec![
            ("A".to_string(), 0.0),
            ("B".to_string(), 50.0),
            ("C".to_string(), 100.0)
        ]
    );
}

#[test]
fn test_failed_reload_keeps_previous_engine() {
    let handle = ready_handle("reload");
    let before = handle.engine().unwrap();

    let bad = write_fixtures(
        "reload_bad",
        "- { sector: Even, indicator: x, weight: 0 }\n- { sector: Even, indicator: y, weight: 0 }\n- { sector: OnlyX, indicator: x, weight: 1 }\n- { sector: OnlyX, indicator: y, weight: 0 }\n",
    );
    let err = handle
        .initialize_from_paths(&bad, EnginePolicy::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::Configuration(ref msg) if msg.contains("Even")));

    let after = handle.engine().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn test_null_cell_fails_load() {
    let paths = write_fixtures("null_cell", WEIGHTS_YAML);
    fs::write(
        &paths.values,
        r#"[{ "province": "A", "values": { "x": null, "y": 1 } },
            { "province": "B", "values": { "x": 2, "y": 2 } },
            { "province": "C", "values": { "x": 3, "y": 3 } }]"#,
    )
    .unwrap();
    let sources = Sources::read(&paths).unwrap();
    let err = EngineHandle::new()
        .initialize(&sources, EnginePolicy::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::DataLoad(ref msg) if msg.contains("'x'")));
}

#[test]
fn test_unsupported_extension_fails_load() {
    let mut paths = write_fixtures("bad_ext", WEIGHTS_YAML);
    let csv = paths.values.with_extension("csv");
    fs::write(&csv, "province,x,y\n").unwrap();
    paths.values = csv;
    assert!(matches!(
        Sources::read(&paths).unwrap_err(),
        EngineError::DataLoad(_)
    ));
}

#[test]
fn test_concurrent_queries_see_identical_results() {
    let handle = ready_handle("concurrent");
    let q = query(Mode::SectorToProvince, "Even", 3);
    let expected = handle.query(&q, &ReasonOptions::default()).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let got = handle.query(&q, &ReasonOptions::default()).unwrap();
                    assert_eq!(got, expected);
                }
            });
        }
    });
}

#[test]
fn test_config_drives_initialization() {
    let paths = write_fixtures("config", WEIGHTS_YAML);
    let dir: PathBuf = paths.values.parent().unwrap().to_path_buf();
    let config_path = dir.join("config.yaml");
    fs::write(
        &config_path,
        "data:\n  values: values.json\n  directions: directions.yaml\n  weights: weights.yaml\n  registry: registry.yml\npolicy:\n  missing_weight: reject\noutput:\n  top: 2\n",
    )
    .unwrap();

    let config = load_config(Some(config_path)).unwrap();
    let handle = EngineHandle::new();
    handle
        .initialize_from_paths(&config.data.source_paths(), config.effective_policy())
        .unwrap();

    let found = names(
        &handle,
        &query(Mode::SectorToProvince, "Even", config.default_top()),
    );
    assert_eq!(found, vec!["C", "B"]);
}
