//! Focused unit tests covering plan CLI configuration and input parsing.

use std::time::Duration;

use healthroute_core::{PlannerConfig, RequestId, RequestValidationError};
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;

use super::helpers::{VALID_REQUEST, Workspace};
use crate::plan::{
    DEFAULT_MOBILITY_BASE_URL, DEFAULT_ROUTING_BASE_URL, PlanArgs, PlanConfig,
    config_from_layers_for_test, load_plan_request, load_planner_config,
};
use crate::{ARG_PLAN_REQUEST, ARG_PLANNER_CONFIG, CliError, ENV_PLAN_REQUEST};

fn config_for(request_path: camino::Utf8PathBuf) -> PlanConfig {
    PlanConfig::try_from(PlanArgs {
        request_path: Some(request_path),
        ..PlanArgs::default()
    })
    .expect("config should build")
}

#[rstest]
fn converting_plan_without_request_errors() {
    let err = PlanConfig::try_from(PlanArgs::default()).expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(env, ENV_PLAN_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_applies_defaults() {
    let workspace = Workspace::new();
    let config = config_for(workspace.path("request.json"));

    assert_eq!(config.routing_base_url, DEFAULT_ROUTING_BASE_URL);
    assert_eq!(config.mobility_base_url, DEFAULT_MOBILITY_BASE_URL);
    assert_eq!(config.http_timeout, Duration::from_secs(10));
    assert!(config.planner_config.is_none());
    assert!(config.request_id.is_none());
}

#[rstest]
fn validate_sources_accepts_existing_inputs() {
    let workspace = Workspace::new();
    let mut config = config_for(workspace.write("request.json", VALID_REQUEST));
    config.planner_config = Some(workspace.write("planner.json", "{}"));

    config.validate_sources().expect("inputs exist");
}

#[rstest]
#[case::missing_request(ARG_PLAN_REQUEST)]
#[case::missing_planner_config(ARG_PLANNER_CONFIG)]
fn validate_sources_reports_missing_inputs(#[case] missing: &'static str) {
    let workspace = Workspace::new();
    let request_path = if missing == ARG_PLAN_REQUEST {
        workspace.path("request.json")
    } else {
        workspace.write("request.json", VALID_REQUEST)
    };
    let mut config = config_for(request_path);
    config.planner_config = Some(workspace.path("planner.json"));

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, missing),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let workspace = Workspace::new();
    let request_path = workspace.path("request.json");
    std::fs::create_dir(&request_path).expect("request directory");

    let err = config_for(request_path.clone())
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_plan_request_resolves_input() {
    let workspace = Workspace::new();
    let path = workspace.write("request.json", VALID_REQUEST);

    let request = load_plan_request(&path, RequestId::new("req-unit")).expect("request decodes");

    assert_eq!(request.request_id.as_str(), "req-unit");
    assert!((request.origin.lat - 47.2184).abs() < 1e-9);
    assert_eq!(request.departure.to_string(), "2024-05-01T08:00:00Z");
}

#[rstest]
fn load_plan_request_rejects_invalid_json() {
    let workspace = Workspace::new();
    let path = workspace.write("request.json", "{ not valid json");

    let err = load_plan_request(&path, RequestId::new("req-unit")).expect_err("invalid json");
    match err {
        CliError::ParseInput { field, path: seen, .. } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(seen, path);
        }
        other => panic!("expected ParseInput, found {other:?}"),
    }
}

#[rstest]
fn load_plan_request_reports_missing_file() {
    let workspace = Workspace::new();
    let path = workspace.path("request.json");

    let err = load_plan_request(&path, RequestId::new("req-unit")).expect_err("missing file");
    assert!(matches!(err, CliError::OpenInput { .. }), "got {err:?}");
}

#[rstest]
#[case::unresolved_address(
    r#"{"origin": {"address": "Place du Commerce"}, "destination": {"lat": 47.2, "lon": -1.5}, "goals": {"walk_minutes": 20}}"#,
    RequestValidationError::UnresolvedAddress { field: "origin" }
)]
#[case::zero_walk_goal(
    r#"{"origin": {"lat": 47.2, "lon": -1.55}, "destination": {"lat": 47.21, "lon": -1.55}, "goals": {"walk_minutes": 0}}"#,
    RequestValidationError::OutOfBounds { field: "walk_minutes", bound: "greater than 0", value: 0.0 }
)]
fn load_plan_request_rejects_invalid_requests(
    #[case] payload: &str,
    #[case] expected: RequestValidationError,
) {
    let workspace = Workspace::new();
    let path = workspace.write("request.json", payload);

    let err = load_plan_request(&path, RequestId::new("req-unit")).expect_err("invalid request");
    match err {
        CliError::InvalidPlanRequest { source, .. } => assert_eq!(source, expected),
        other => panic!("expected InvalidPlanRequest, found {other:?}"),
    }
}

#[rstest]
fn load_planner_config_keeps_unset_defaults() {
    let workspace = Workspace::new();
    let path = workspace.write("planner.json", r#"{"alternatives": 1}"#);

    let config = load_planner_config(&path).expect("config decodes");

    assert_eq!(config.alternatives, 1);
    assert_eq!(
        config.generation_deadline_ms,
        PlannerConfig::default().generation_deadline_ms
    );
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert!(matches!(err, CliError::Configuration(_)), "got {err:?}");
}

#[rstest]
fn merge_layers_honours_precedence() {
    let workspace = Workspace::new();
    let env_request = workspace.path("from-env-request.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "routing_base_url": "http://from-file:8002",
            "http_timeout_ms": 2500,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": env_request.as_str(),
        "routing_base_url": "http://from-env:8002",
    }));
    composer.push_cli(json!({
        "mobility_base_url": "http://from-cli:8003",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");

    assert_eq!(config.request_path, env_request);
    assert_eq!(config.routing_base_url, "http://from-env:8002");
    assert_eq!(config.mobility_base_url, "http://from-cli:8003");
    assert_eq!(config.http_timeout, Duration::from_millis(2500));
}

#[rstest]
fn request_ids_default_to_fresh_uuids() {
    let workspace = Workspace::new();
    let path = workspace.write("request.json", VALID_REQUEST);
    let mut config = config_for(path.clone());

    let generated = load_plan_request(&path, config.request_id()).expect("request decodes");
    assert!(uuid::Uuid::parse_str(generated.request_id.as_str()).is_ok());

    config.request_id = Some("req-fixed".to_owned());
    let fixed = load_plan_request(&path, config.request_id()).expect("request decodes");
    assert_eq!(fixed.request_id.as_str(), "req-fixed");
}
