//! Shared test helpers for role and driver tests.

use ace_core::error::ProviderError;
use ace_core::message::Message;
use ace_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::{Arc, Mutex};

use crate::roles::RoleClient;

/// A mock gateway that returns a sequence of scripted replies.
///
/// Each call to `complete` returns the next reply in the queue and records
/// the request it was given. Panics if more calls are made than replies.
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies that all succeed with the given raw texts.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The request received by call number `index` (0-based).
    pub fn request(&self, index: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        let replies = self.replies.lock().unwrap();

        if call >= replies.len() {
            panic!(
                "ScriptedProvider: no more replies (call #{}, have {})",
                call,
                replies.len()
            );
        }

        requests.push(request);
        let text = replies[call].clone()?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// A role client backed by the given scripted provider.
pub fn client(provider: &Arc<ScriptedProvider>) -> RoleClient {
    RoleClient::new(provider.clone(), "mock-model")
}

pub fn generator_reply(bullet_ids: &[&str], answer: &str) -> String {
    serde_json::json!({
        "reasoning": "walked the floor plan",
        "bullet_ids": bullet_ids,
        "final_answer": answer,
    })
    .to_string()
}

pub fn reflector_reply(tags: &[(&str, &str)]) -> String {
    let tags: Vec<_> = tags
        .iter()
        .map(|(id, tag)| serde_json::json!({"bullet_id": id, "tag": tag}))
        .collect();
    serde_json::json!({
        "reasoning": "compared with the reference path",
        "error_identification": "skipped the upper living room",
        "root_cause_analysis": "did not follow the stairs",
        "correct_approach": "trace each room the stairs connect",
        "key_insight": "list every room on the way, in order",
        "bullet_tags": tags,
    })
    .to_string()
}

pub fn curator_reply(contents: &[&str]) -> String {
    let ops: Vec<_> = contents
        .iter()
        .map(|c| serde_json::json!({"type": "ADD", "section": "paths", "content": c}))
        .collect();
    serde_json::json!({
        "reasoning": "the playbook has no path-tracing advice",
        "operations": ops,
    })
    .to_string()
}
