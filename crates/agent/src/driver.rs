//! The iteration driver.
//!
//! Owns the playbook and runs the fixed stage order. Roles only ever see a
//! shared reference to the playbook; the two mutations (tag update and ADD
//! merge) happen here, after the stage that produced them succeeded.

use ace_core::error::Error;
use ace_core::event::{DomainEvent, EventBus};
use ace_core::playbook::{BulletId, Playbook};
use ace_core::provider::{Provider, Usage};
use ace_core::task::Task;
use ace_core::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::roles::{
    Curator, CuratorOutput, Generator, GeneratorOutput, Reflector, ReflectorOutput, RoleClient,
};

/// Everything one iteration produced.
#[derive(Debug, Clone)]
pub struct IterationReport {
    /// 1-based iteration number
    pub iteration: usize,
    pub generator: GeneratorOutput,
    pub reflector: ReflectorOutput,
    pub curator: CuratorOutput,
    /// Number of counter increments applied
    pub tags_applied: usize,
    /// Ids minted for the curator's additions
    pub bullets_added: Vec<BulletId>,
    /// The playbook as it stood when the iteration finished
    pub playbook: Playbook,
    /// Playbook size once the iteration finished
    pub playbook_size: usize,
    /// Token usage summed over the three gateway calls
    pub usage: Usage,
}

/// Generator → reflector → tag update → curator → merge, repeated.
pub struct PlaybookLoop {
    generator: Generator,
    reflector: Reflector,
    curator: Curator,
    playbook: Playbook,
    event_bus: Arc<EventBus>,
    iterations_run: usize,
}

impl PlaybookLoop {
    /// Create a loop whose three roles share one gateway and model.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self::from_client(RoleClient::new(provider, model))
    }

    /// Create a loop from a preconfigured role client.
    pub fn from_client(client: RoleClient) -> Self {
        Self {
            generator: Generator::new(client.clone()),
            reflector: Reflector::new(client.clone()),
            curator: Curator::new(client),
            playbook: Playbook::new(),
            event_bus: Arc::new(EventBus::default()),
            iterations_run: 0,
        }
    }

    /// Start from an existing playbook instead of an empty one.
    pub fn with_playbook(mut self, playbook: Playbook) -> Self {
        self.playbook = playbook;
        self
    }

    /// Publish progress on the given bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn playbook(&self) -> &Playbook {
        &self.playbook
    }

    pub fn into_playbook(self) -> Playbook {
        self.playbook
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    pub fn iterations_run(&self) -> usize {
        self.iterations_run
    }

    /// Run `iterations` iterations, stopping at the first error.
    pub async fn run(&mut self, task: &Task, iterations: usize) -> Result<Vec<IterationReport>> {
        let mut reports = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            reports.push(self.run_iteration(task).await?);
        }
        Ok(reports)
    }

    /// Run one full iteration.
    ///
    /// Any failure aborts the iteration before the remaining stages run. A
    /// failed tag update leaves the playbook untouched; a failed curator call
    /// leaves the tags from this iteration in place.
    pub async fn run_iteration(&mut self, task: &Task) -> Result<IterationReport> {
        let iteration = self.iterations_run + 1;
        let context = &task.context;
        let mut usage = Usage::default();

        info!(iteration, playbook_size = self.playbook.len(), "Starting iteration");
        self.event_bus.publish(DomainEvent::IterationStarted {
            iteration,
            playbook_size: self.playbook.len(),
            timestamp: Utc::now(),
        });

        // 1. Generate
        let generated = self
            .generator
            .complete(&self.playbook, context)
            .await
            .inspect_err(|e| self.report_failure("generator", e))?;
        usage.add(&generated.usage);
        let generated = generated.output;
        debug!(answer = %generated.final_answer, "Generator output");
        self.event_bus.publish(DomainEvent::AnswerGenerated {
            iteration,
            bullets_used: generated.bullet_ids.len(),
            timestamp: Utc::now(),
        });

        // 2. Reflect
        let reflected = self
            .reflector
            .complete(&self.playbook, context, &generated, &task.ground_truth)
            .await
            .inspect_err(|e| self.report_failure("reflector", e))?;
        usage.add(&reflected.usage);
        let reflected = reflected.output;

        // 3. Tag
        let tags_applied = self
            .playbook
            .apply_tags(&reflected.bullet_tags)
            .map_err(Error::from)
            .inspect_err(|e| self.report_failure("tag_update", e))?;
        self.event_bus.publish(DomainEvent::BulletsTagged {
            iteration,
            count: tags_applied,
            timestamp: Utc::now(),
        });

        // 4. Curate
        let curated = self
            .curator
            .complete(&self.playbook, context, &reflected)
            .await
            .inspect_err(|e| self.report_failure("curator", e))?;
        usage.add(&curated.usage);
        let curated = curated.output;

        // 5. Merge
        let bullets_added = self.playbook.merge(&curated.operations);
        self.event_bus.publish(DomainEvent::BulletsAdded {
            iteration,
            bullet_ids: bullets_added.iter().map(|id| id.to_string()).collect(),
            timestamp: Utc::now(),
        });

        self.iterations_run = iteration;
        let playbook_size = self.playbook.len();
        info!(
            iteration,
            tags_applied,
            added = bullets_added.len(),
            playbook_size,
            tokens = usage.total_tokens,
            "Iteration complete"
        );
        self.event_bus.publish(DomainEvent::IterationCompleted {
            iteration,
            playbook_size,
            tokens_used: usage.total_tokens,
            timestamp: Utc::now(),
        });

        Ok(IterationReport {
            iteration,
            generator: generated,
            reflector: reflected,
            curator: curated,
            tags_applied,
            bullets_added,
            playbook: self.playbook.clone(),
            playbook_size,
            usage,
        })
    }

    fn report_failure(&self, stage: &str, err: &Error) {
        warn!(stage, error = %err, "Iteration aborted");
        self.event_bus.publish(DomainEvent::ErrorOccurred {
            context: stage.to_string(),
            error_message: err.to_string(),
            timestamp: Utc::now(),
        });
    }
}
