//! Error types emitted by the healthroute CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use healthroute_core::RequestValidationError;
use healthroute_data::ClientBuildError;
use healthroute_planner::PlanError;
use thiserror::Error;

/// Errors emitted by the healthroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that also supplies it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening an input file failed.
    #[error("failed to open {field} at {path:?}: {source}")]
    OpenInput {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// An input file is not valid JSON for its type.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The plan request failed validation.
    #[error("plan request in {path:?} failed validation: {source}")]
    InvalidPlanRequest {
        /// Request file.
        path: Utf8PathBuf,
        /// First violation found.
        #[source]
        source: RequestValidationError,
    },
    /// Constructing an HTTP collaborator failed.
    #[error("failed to build {service} client for {base_url:?}: {source}")]
    BuildClient {
        /// Which collaborator.
        service: &'static str,
        /// Configured base URL.
        base_url: String,
        /// Construction failure.
        #[source]
        source: ClientBuildError,
    },
    /// Building the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The planner could not produce a response.
    #[error("planning failed: {0}")]
    Plan(#[source] PlanError),
    /// Serialising the plan response failed.
    #[error("failed to serialise plan response: {0}")]
    SerialisePlanResponse(#[source] serde_json::Error),
    /// Writing the plan output failed.
    #[error("failed to write plan output: {0}")]
    WritePlanOutput(#[source] std::io::Error),
}
