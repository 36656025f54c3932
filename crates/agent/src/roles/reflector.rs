//! Reflector: diagnoses the generator's answer against the ground truth
//! and tags the bullets it used.

use ace_core::playbook::{BulletId, BulletTag, Playbook};
use ace_core::task::TaskContext;
use ace_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::prompts::{render_reflector_request, REFLECTOR_INSTRUCTIONS};
use super::{Completion, GeneratorOutput, RoleClient, RoleOutput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectorOutput {
    pub reasoning: String,
    pub error_identification: String,
    pub root_cause_analysis: String,
    pub correct_approach: String,
    pub key_insight: String,
    pub bullet_tags: Vec<BulletTag>,
}

impl RoleOutput for ReflectorOutput {
    const RECORD: &'static str = "ReflectorOutput";
}

impl ReflectorOutput {
    /// Used bullet ids that received no tag.
    pub fn untagged<'a>(&self, used: &'a [BulletId]) -> Vec<&'a BulletId> {
        used.iter()
            .filter(|id| !self.bullet_tags.iter().any(|t| &t.bullet_id == *id))
            .collect()
    }
}

pub struct Reflector {
    client: RoleClient,
}

impl Reflector {
    pub fn new(client: RoleClient) -> Self {
        Self { client }
    }

    /// Reflect on one answer, keeping the gateway's usage report.
    ///
    /// Every used bullet is expected to come back tagged; a missing tag is
    /// logged, not rejected.
    pub async fn complete(
        &self,
        playbook: &Playbook,
        context: &TaskContext,
        generated: &GeneratorOutput,
        ground_truth: &str,
    ) -> Result<Completion<ReflectorOutput>> {
        let data = render_reflector_request(playbook, context, generated, ground_truth);
        let completion: Completion<ReflectorOutput> =
            self.client.call(REFLECTOR_INSTRUCTIONS, data).await?;

        for id in completion.output.untagged(&generated.bullet_ids) {
            warn!(bullet_id = %id, "Reflector left a used bullet untagged");
        }
        info!(tags = completion.output.bullet_tags.len(), "Reflector diagnosed answer");
        Ok(completion)
    }

    pub async fn run(
        &self,
        playbook: &Playbook,
        context: &TaskContext,
        generated: &GeneratorOutput,
        ground_truth: &str,
    ) -> Result<ReflectorOutput> {
        self.complete(playbook, context, generated, ground_truth)
            .await
            .map(|c| c.output)
    }
}
