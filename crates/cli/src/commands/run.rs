//! `ace run`: Run the playbook loop on a task.

use ace_agent::{IterationReport, PlaybookLoop, RoleClient};
use ace_config::{AppConfig, TaskFile};
use ace_core::error::ProviderError;
use ace_core::event::{DomainEvent, EventBus};
use ace_core::provider::Usage;
use ace_providers::router;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

pub async fn run(
    task_path: Option<PathBuf>,
    iterations: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let task_path = task_path.unwrap_or_else(AppConfig::default_task_path);
    let task = TaskFile::load_from(&task_path)?;
    let iterations = iterations.unwrap_or(config.loop_config.iterations);
    if iterations == 0 {
        return Err("--iterations must be at least 1".into());
    }

    let router = router::build_from_config(&config)?;
    let provider = router.default().ok_or_else(|| {
        ProviderError::NotConfigured(format!("provider '{}'", config.default_provider))
    })?;

    let client = RoleClient::new(provider, config.model())
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);

    let show_progress = config.loop_config.show_progress && !json;
    if show_progress {
        println!(
            "🧠 ACE: {} iteration(s) with {} / {}",
            iterations,
            client.provider_name(),
            client.model()
        );
        println!("   Task: {}\n", task_path.display());
    }

    let bus = Arc::new(EventBus::default());
    let progress = show_progress.then(|| tokio::spawn(follow_progress(bus.subscribe())));
    let mut ace = PlaybookLoop::from_client(client).with_event_bus(bus.clone());

    let outcome = ace.run(&task, iterations).await;

    // Dropping every sender closes the channel and ends the progress task.
    let playbook = ace.into_playbook();
    drop(bus);
    if let Some(progress) = progress {
        let _ = progress.await;
    }
    let reports = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&playbook)?);
        return Ok(());
    }

    if show_progress {
        for report in &reports {
            print_report(report);
        }
    }
    println!("Final playbook ({} bullets):", playbook.len());
    println!("{}\n", playbook.render());
    println!("Tokens used: {}", total_usage(&reports).total_tokens);

    Ok(())
}

/// Print one line per loop event until the bus closes.
async fn follow_progress(mut rx: broadcast::Receiver<Arc<DomainEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => println!("  {}", describe(&event)),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn describe(event: &DomainEvent) -> String {
    match event {
        DomainEvent::IterationStarted {
            iteration,
            playbook_size,
            ..
        } => format!("▶ iteration {iteration} started ({playbook_size} bullets)"),
        DomainEvent::AnswerGenerated {
            iteration,
            bullets_used,
            ..
        } => format!("  [{iteration}] generator answered using {bullets_used} bullet(s)"),
        DomainEvent::BulletsTagged {
            iteration, count, ..
        } => format!("  [{iteration}] reflector tags applied: {count}"),
        DomainEvent::BulletsAdded {
            iteration,
            bullet_ids,
            ..
        } => format!("  [{iteration}] curator added {} bullet(s)", bullet_ids.len()),
        DomainEvent::IterationCompleted {
            iteration,
            playbook_size,
            tokens_used,
            ..
        } => format!(
            "✔ iteration {iteration} complete ({playbook_size} bullets, {tokens_used} tokens)"
        ),
        DomainEvent::ErrorOccurred {
            context,
            error_message,
            ..
        } => format!("✘ {context} failed: {error_message}"),
    }
}

fn total_usage(reports: &[IterationReport]) -> Usage {
    let mut total = Usage::default();
    for report in reports {
        total.add(&report.usage);
    }
    total
}

fn print_report(report: &IterationReport) {
    println!("━━━ Iteration {} ━━━", report.iteration);

    println!("Generator:");
    println!("  reasoning:    {}", report.generator.reasoning);
    println!("  bullets used: {}", join_ids(report.generator.bullet_ids.iter()));
    println!("  answer:       {}", report.generator.final_answer);

    println!("Reflector:");
    println!("  error:        {}", report.reflector.error_identification);
    println!("  root cause:   {}", report.reflector.root_cause_analysis);
    println!("  correct:      {}", report.reflector.correct_approach);
    println!("  key insight:  {}", report.reflector.key_insight);
    for tag in &report.reflector.bullet_tags {
        println!("  tag:          {} → {}", tag.bullet_id, tag.tag.as_str());
    }

    println!("Curator:");
    println!("  reasoning:    {}", report.curator.reasoning);
    println!("  added:        {}", join_ids(report.bullets_added.iter()));
    println!("Playbook ({} bullets):", report.playbook_size);
    println!("{}", report.playbook.render());
    println!(
        "Tokens: {} ({} tags applied)\n",
        report.usage.total_tokens, report.tags_applied
    );
}

fn join_ids<'a, T: std::fmt::Display + 'a>(ids: impl Iterator<Item = &'a T>) -> String {
    let ids: Vec<String> = ids.map(|id| id.to_string()).collect();
    if ids.is_empty() {
        "(none)".into()
    } else {
        ids.join(", ")
    }
}
