//! Curator: proposes playbook additions from a reflection.

use ace_core::playbook::{CuratorOperation, Playbook};
use ace_core::task::TaskContext;
use ace_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::prompts::{render_curator_request, CURATOR_INSTRUCTIONS};
use super::{Completion, ReflectorOutput, RoleClient, RoleOutput};

/// Proposed edits. An empty `operations` list means the playbook already
/// covers the diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratorOutput {
    pub reasoning: String,
    pub operations: Vec<CuratorOperation>,
}

impl RoleOutput for CuratorOutput {
    const RECORD: &'static str = "CuratorOutput";
}

pub struct Curator {
    client: RoleClient,
}

impl Curator {
    pub fn new(client: RoleClient) -> Self {
        Self { client }
    }

    pub async fn complete(
        &self,
        playbook: &Playbook,
        context: &TaskContext,
        reflection: &ReflectorOutput,
    ) -> Result<Completion<CuratorOutput>> {
        let data = render_curator_request(playbook, context, reflection);
        let completion: Completion<CuratorOutput> =
            self.client.call(CURATOR_INSTRUCTIONS, data).await?;

        info!(operations = completion.output.operations.len(), "Curator proposed edits");
        Ok(completion)
    }

    pub async fn run(
        &self,
        playbook: &Playbook,
        context: &TaskContext,
        reflection: &ReflectorOutput,
    ) -> Result<CuratorOutput> {
        self.complete(playbook, context, reflection).await.map(|c| c.output)
    }
}
