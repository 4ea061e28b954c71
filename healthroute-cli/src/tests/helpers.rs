//! Test helpers for plan CLI inputs and stubbed collaborators.

use std::sync::Arc;

use camino::Utf8PathBuf;
use healthroute_core::test_support::{StubMobilityClient, StubRoutingClient};
use tempfile::TempDir;

use crate::CliError;
use crate::plan::{CollaboratorBuilder, PlanCollaborators, PlanConfig};

/// A plan request with a 20 minute walking goal across central Nantes.
pub(super) const VALID_REQUEST: &str = r#"{
    "origin": {"lat": 47.2184, "lon": -1.5536},
    "destination": {"lat": 47.2065, "lon": -1.5390},
    "departure_time": "2024-05-01T08:00:00Z",
    "goals": {"walk_minutes": 20}
}"#;

/// A temporary directory holding CLI inputs.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `contents` to `name` and return its path.
    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write input file");
        path
    }
}

/// Hands out prebuilt stubs instead of HTTP clients.
#[derive(Debug, Default)]
pub(super) struct StubCollaboratorBuilder {
    pub(super) routing: Arc<StubRoutingClient>,
    pub(super) mobility: Arc<StubMobilityClient>,
}

impl CollaboratorBuilder for StubCollaboratorBuilder {
    fn build(&self, _config: &PlanConfig) -> Result<PlanCollaborators, CliError> {
        Ok(PlanCollaborators {
            routing: Arc::<StubRoutingClient>::clone(&self.routing),
            mobility: Arc::<StubMobilityClient>::clone(&self.mobility),
        })
    }
}
