//! Plan command implementation for the healthroute CLI.

use std::io::{BufReader, Write};
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use healthroute_core::{
    MobilityClient, PlanRequest, PlanRequestInput, PlanResponse, PlannerConfig, RequestId,
    RoutingClient,
};
use healthroute_data::{HttpClientConfig, HttpMobilityClient, HttpRoutingClient};
use healthroute_planner::Planner;
use jiff::Timestamp;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ARG_HTTP_TIMEOUT_MS, ARG_MOBILITY_BASE_URL, ARG_PLAN_REQUEST, ARG_PLANNER_CONFIG,
    ARG_REQUEST_ID, ARG_ROUTING_BASE_URL, CliError, ENV_PLAN_REQUEST, fs,
};

/// Routing service address used when none is configured.
pub(crate) const DEFAULT_ROUTING_BASE_URL: &str = "http://localhost:8002";
/// Mobility service address used when none is configured.
pub(crate) const DEFAULT_MOBILITY_BASE_URL: &str = "http://localhost:8003";
/// Transport timeout used when none is configured.
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "plan",
    long_about = "Plan an activity-enriched trip. The request is a JSON file \
                 with origin, destination, departure time and activity goals; \
                 the routing and mobility services are reached over HTTP. \
                 Options can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Plan an activity-enriched trip"
)]
#[ortho_config(prefix = "HEALTHROUTE")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing the trip request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for the routing service (e.g. "http://localhost:8002").
    #[arg(long = ARG_ROUTING_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) routing_base_url: Option<String>,
    /// Base URL for the mobility service (e.g. "http://localhost:8003").
    #[arg(long = ARG_MOBILITY_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) mobility_base_url: Option<String>,
    /// Path to a JSON file overriding planner tuning.
    #[arg(long = ARG_PLANNER_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) planner_config: Option<Utf8PathBuf>,
    /// Transport timeout for each HTTP request, in milliseconds.
    #[arg(long = ARG_HTTP_TIMEOUT_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) http_timeout_ms: Option<u64>,
    /// Correlation identifier; a random UUID is generated when absent.
    #[arg(long = ARG_REQUEST_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) request_id: Option<String>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Base URL for the routing service.
    pub(crate) routing_base_url: String,
    /// Base URL for the mobility service.
    pub(crate) mobility_base_url: String,
    /// Optional planner tuning file.
    pub(crate) planner_config: Option<Utf8PathBuf>,
    /// Transport timeout for HTTP requests.
    pub(crate) http_timeout: Duration,
    /// Caller-supplied correlation identifier.
    pub(crate) request_id: Option<String>,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.request_path, ARG_PLAN_REQUEST)?;
        if let Some(path) = &self.planner_config {
            Self::require_existing(path, ARG_PLANNER_CONFIG)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// The configured identifier, or a fresh UUID.
    pub(crate) fn request_id(&self) -> RequestId {
        self.request_id.as_deref().map_or_else(
            || RequestId::new(Uuid::new_v4().to_string()),
            RequestId::from,
        )
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;
        let routing_base_url = args
            .routing_base_url
            .unwrap_or_else(|| DEFAULT_ROUTING_BASE_URL.to_owned());
        let mobility_base_url = args
            .mobility_base_url
            .unwrap_or_else(|| DEFAULT_MOBILITY_BASE_URL.to_owned());
        let http_timeout =
            Duration::from_millis(args.http_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS));

        Ok(Self {
            request_path,
            routing_base_url,
            mobility_base_url,
            planner_config: args.planner_config,
            http_timeout,
            request_id: args.request_id,
        })
    }
}

/// Collaborator clients for one invocation.
pub(crate) struct PlanCollaborators {
    pub(crate) routing: Arc<dyn RoutingClient>,
    pub(crate) mobility: Arc<dyn MobilityClient>,
}

/// Builds the collaborators for the current plan invocation.
pub(super) trait CollaboratorBuilder {
    fn build(&self, config: &PlanConfig) -> Result<PlanCollaborators, CliError>;
}

pub(super) struct HttpCollaboratorBuilder;

impl CollaboratorBuilder for HttpCollaboratorBuilder {
    fn build(&self, config: &PlanConfig) -> Result<PlanCollaborators, CliError> {
        let routing = HttpRoutingClient::with_config(
            HttpClientConfig::new(config.routing_base_url.clone())
                .with_timeout(config.http_timeout),
        )
        .map_err(|source| CliError::BuildClient {
            service: "routing",
            base_url: config.routing_base_url.clone(),
            source,
        })?;
        let mobility = HttpMobilityClient::with_config(
            HttpClientConfig::new(config.mobility_base_url.clone())
                .with_timeout(config.http_timeout),
        )
        .map_err(|source| CliError::BuildClient {
            service: "mobility",
            base_url: config.mobility_base_url.clone(),
            source,
        })?;
        Ok(PlanCollaborators {
            routing: Arc::new(routing),
            mobility: Arc::new(mobility),
        })
    }
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &HttpCollaboratorBuilder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn CollaboratorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let response = execute_plan(args, builder)?;
    write_plan_response(writer, &response)
}

fn execute_plan(
    args: PlanArgs,
    builder: &dyn CollaboratorBuilder,
) -> Result<PlanResponse, CliError> {
    let config = resolve_plan_config(args)?;
    let planner_config = config
        .planner_config
        .as_deref()
        .map(load_planner_config)
        .transpose()?
        .unwrap_or_default();
    let request = load_plan_request(&config.request_path, config.request_id())?;
    let collaborators = builder.build(&config)?;
    let planner =
        Planner::with_config(collaborators.routing, collaborators.mobility, planner_config);

    info!(
        "request_id={} planning {} with routing={} mobility={}",
        request.request_id, config.request_path, config.routing_base_url, config.mobility_base_url
    );
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime
        .block_on(planner.generate_plan(&request))
        .map_err(CliError::Plan)
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn load_json<T: DeserializeOwned>(path: &Utf8Path, field: &'static str) -> Result<T, CliError> {
    let file = fs::open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and validates a JSON-encoded trip request.
///
/// A departure of `"now"` resolves against the wall clock here, so the
/// planner never reads it.
pub(super) fn load_plan_request(
    path: &Utf8Path,
    request_id: RequestId,
) -> Result<PlanRequest, CliError> {
    let input: PlanRequestInput = load_json(path, ARG_PLAN_REQUEST)?;
    input
        .into_request(Timestamp::now(), request_id)
        .map_err(|source| CliError::InvalidPlanRequest {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads planner tuning; absent fields keep their defaults.
pub(super) fn load_planner_config(path: &Utf8Path) -> Result<PlannerConfig, CliError> {
    load_json(path, ARG_PLANNER_CONFIG)
}

fn write_plan_response(writer: &mut dyn Write, response: &PlanResponse) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(response).map_err(CliError::SerialisePlanResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WritePlanOutput)?;
    writer.write_all(b"\n").map_err(CliError::WritePlanOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
