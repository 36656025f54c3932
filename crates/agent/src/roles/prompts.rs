//! Role instructions and request rendering.
//!
//! Wording here can change freely; what the rest of the crate relies on is
//! which data each request carries and the JSON keys each role is asked for.

use ace_core::playbook::Playbook;
use ace_core::task::TaskContext;
use std::fmt::Write as _;

use super::{GeneratorOutput, ReflectorOutput};

pub const GENERATOR_INSTRUCTIONS: &str = "\
You are an analysis expert. Answer the user's question using your own knowledge \
and the playbook of strategies, formulas, and insights you are given.

- Read the playbook and apply the entries that are relevant.
- Avoid the mistakes the playbook warns about.
- Reason step by step, concisely, and check your logic before answering.

Respond with a single JSON object with these keys:
- reasoning: your step-by-step analysis
- bullet_ids: ids of every playbook bullet you found relevant
- final_answer: your concise final answer

Output only the JSON object.";

pub const REFLECTOR_INSTRUCTIONS: &str = "\
You are an expert analyst and educator. Diagnose why a model's answer went wrong \
by comparing its reasoning and answer with the ground truth.

- Find where the reasoning diverged: conceptual errors, calculation mistakes, \
misapplied strategies, or the wrong output style.
- Focus on the root cause, not surface symptoms.
- Say concretely what the model should have done instead.
- Tag every playbook bullet the model used as 'helpful', 'harmful', or 'neutral'.

Respond with a single JSON object with these keys:
- reasoning
- error_identification: what specifically went wrong
- root_cause_analysis: why it went wrong
- correct_approach: what the model should have done
- key_insight: the principle to remember next time
- bullet_tags: a list of {\"bullet_id\": ..., \"tag\": ...} objects

Output only the JSON object.";

pub const CURATOR_INSTRUCTIONS: &str = "\
You are a master curator of knowledge. Decide what new insights should be added to \
an existing playbook, based on a reflection on a previous attempt.

The playbook will be used on similar questions where the ground truth is NOT \
available, so additions must help produce answers that match it anyway.

- Add only insights that are missing from the playbook; skip anything redundant.
- Do not regenerate the playbook, only list additions.
- Prefer a few focused, actionable bullets over many vague ones.
- If nothing is worth adding, return an empty operations list.
- Do not include bullet ids or counters in content; the system assigns them.

Respond with a single JSON object with these keys:
- reasoning
- operations: a list of {\"type\": \"ADD\", \"section\": ..., \"content\": ...} objects

Output only valid JSON, with no markdown or code fences.";

fn push_block(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "{title}:\n{body}\n");
}

/// The generator sees the playbook and the task context, never the ground truth.
pub fn render_generator_request(playbook: &Playbook, context: &TaskContext) -> String {
    let mut out = String::new();
    push_block(&mut out, "Playbook", &playbook.render());
    push_block(&mut out, "User's System Prompt (Context) and User Prompt (Query)", &context.to_json());
    out.push_str(
        "Answer in strict JSON with the keys \"reasoning\", \"bullet_ids\", and \"final_answer\".",
    );
    out
}

pub fn render_reflector_request(
    playbook: &Playbook,
    context: &TaskContext,
    generated: &GeneratorOutput,
    ground_truth: &str,
) -> String {
    let mut out = String::new();
    push_block(&mut out, "Playbook", &playbook.render());
    push_block(&mut out, "User's System Prompt (Context) and User Prompt (Query)", &context.to_json());
    push_block(&mut out, "Model's Reasoning Trace and Predicted Answer", &to_json(generated));

    let mut used = String::new();
    for id in &generated.bullet_ids {
        match playbook.get(id) {
            Some(bullet) => {
                let _ = writeln!(used, "[{id}] {}", bullet.content);
            }
            None => {
                let _ = writeln!(used, "[{id}] (not in playbook)");
            }
        }
    }
    if used.is_empty() {
        used.push_str("(none)");
    }
    push_block(&mut out, "Bullets Used by the Model", used.trim_end());

    push_block(&mut out, "Ground Truth Answer", ground_truth);
    out.push_str(
        "Answer in strict JSON with the keys \"reasoning\", \"error_identification\", \
         \"root_cause_analysis\", \"correct_approach\", \"key_insight\", and \"bullet_tags\".",
    );
    out
}

pub fn render_curator_request(
    playbook: &Playbook,
    context: &TaskContext,
    reflection: &ReflectorOutput,
) -> String {
    let mut out = String::new();
    push_block(&mut out, "Current Playbook", &playbook.render());
    push_block(&mut out, "User's System Prompt (Context) and User Prompt (Query)", &context.to_json());
    push_block(&mut out, "Reflection on the Previous Attempt", &to_json(reflection));
    out.push_str(
        "Answer in strict JSON with the keys \"reasoning\" and \"operations\". \
         Each operation is {\"type\": \"ADD\", \"section\": ..., \"content\": ...}.",
    );
    out
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("(unserializable: {e})"))
}
