//! Generator: answers the task using the playbook.

use ace_core::playbook::{BulletId, Playbook};
use ace_core::task::TaskContext;
use ace_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::prompts::{render_generator_request, GENERATOR_INSTRUCTIONS};
use super::{Completion, RoleClient, RoleOutput};

/// A candidate answer and the bullets the model claims to have used.
///
/// `bullet_ids` is not checked against the playbook here; it decides which
/// bullets the reflector is asked to tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOutput {
    pub reasoning: String,
    pub bullet_ids: Vec<BulletId>,
    pub final_answer: String,
}

impl RoleOutput for GeneratorOutput {
    const RECORD: &'static str = "GeneratorOutput";
}

pub struct Generator {
    client: RoleClient,
}

impl Generator {
    pub fn new(client: RoleClient) -> Self {
        Self { client }
    }

    /// Answer the task, keeping the gateway's usage report.
    pub async fn complete(
        &self,
        playbook: &Playbook,
        context: &TaskContext,
    ) -> Result<Completion<GeneratorOutput>> {
        let data = render_generator_request(playbook, context);
        let completion: Completion<GeneratorOutput> =
            self.client.call(GENERATOR_INSTRUCTIONS, data).await?;

        info!(
            bullets_used = completion.output.bullet_ids.len(),
            "Generator answered"
        );
        Ok(completion)
    }

    /// Answer the task.
    pub async fn run(&self, playbook: &Playbook, context: &TaskContext) -> Result<GeneratorOutput> {
        self.complete(playbook, context).await.map(|c| c.output)
    }
}
