//! End-to-end tests for the ACE playbook loop.
//!
//! These exercise the full pipeline from task file and config to a grown
//! playbook: generator, reflector, tag update, curator, merge.

use std::sync::{Arc, Mutex};

use ace_agent::{PlaybookLoop, RoleClient};
use ace_config::{AppConfig, ProviderConfig, TaskFile};
use ace_core::error::{Error, PlaybookError, ProviderError};
use ace_core::message::Message;
use ace_core::playbook::{Bullet, BulletId, Counter, Playbook};
use ace_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use ace_core::task::{Task, TaskContext};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted texts in sequence and keeps every
/// request it saw.
struct ScriptedProvider {
    replies: Vec<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn user_message(&self, call: usize) -> String {
        self.requests.lock().unwrap()[call].messages[1].content.clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        if call >= self.replies.len() {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                call,
                self.replies.len()
            );
        }
        requests.push(request);
        Ok(ProviderResponse {
            message: Message::assistant(self.replies[call].clone()),
            usage: Some(Usage {
                prompt_tokens: 100,
                completion_tokens: 20,
                total_tokens: 120,
            }),
            model: "e2e-model".into(),
        })
    }
}

fn generator(ids: &[&str], answer: &str) -> String {
    format!(
        "<think>Let me trace the rooms.</think>\n{}",
        serde_json::json!({
            "reasoning": "followed the stairs",
            "bullet_ids": ids,
            "final_answer": answer,
        })
    )
}

fn reflector(tags: &[(&str, &str)]) -> String {
    let tags: Vec<_> = tags
        .iter()
        .map(|(id, tag)| serde_json::json!({"bullet_id": id, "tag": tag}))
        .collect();
    serde_json::json!({
        "reasoning": "compared against the reference",
        "error_identification": "stopped at the upper living room",
        "root_cause_analysis": "ignored the AC control box landmark",
        "correct_approach": "use landmarks to pick the bedroom",
        "key_insight": "landmarks disambiguate rooms on the same floor",
        "bullet_tags": tags,
    })
    .to_string()
}

fn curator(adds: &[&str]) -> String {
    let ops: Vec<_> = adds
        .iter()
        .map(|c| serde_json::json!({"type": "ADD", "section": "navigation", "content": c}))
        .collect();
    serde_json::json!({"reasoning": "new landmark advice", "operations": ops}).to_string()
}

fn house_task() -> Task {
    TaskFile::sample().into()
}

fn seeded_playbook() -> Playbook {
    Playbook::from_bullets([
        (
            BulletId::from("nav-1"),
            Bullet::new("navigation", "The stairs connect the two living rooms"),
        ),
        (
            BulletId::from("fmt-1"),
            Bullet::new("formatting", "Separate nodes with ' -> '"),
        ),
    ])
}

// ── Scripted loop ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_playbook_grows_and_counters_accumulate() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        generator(&["nav-1"], "Master Bedroom -> Living Room -> Stairs"),
        reflector(&[("nav-1", "helpful")]),
        curator(&["Use the AC control box to find the upstairs bedroom"]),
        generator(&["nav-1", "fmt-1"], "Master Bedroom -> Living Room -> Stairs -> Upper Living Room"),
        reflector(&[("nav-1", "helpful"), ("fmt-1", "neutral")]),
        curator(&[]),
        generator(&["fmt-1"], "Bedroom"),
        reflector(&[("fmt-1", "harmful")]),
        curator(&["Name the corner bedroom explicitly", "Start from the master bedroom door"]),
    ]));
    let mut ace = PlaybookLoop::new(provider.clone(), "e2e-model").with_playbook(seeded_playbook());

    let reports = ace.run(&house_task(), 3).await.unwrap();

    assert_eq!(provider.calls(), 9);
    assert_eq!(reports.len(), 3);
    assert_eq!(
        reports.iter().map(|r| r.playbook_size).collect::<Vec<_>>(),
        vec![3, 3, 5]
    );
    assert!(reports[1].bullets_added.is_empty());
    assert_eq!(reports[2].usage.total_tokens, 360);

    let playbook = ace.into_playbook();
    assert_eq!(
        playbook.get(&BulletId::from("nav-1")).unwrap().counter,
        Counter { helpful: 2, harmful: 0, neutral: 0 }
    );
    assert_eq!(
        playbook.get(&BulletId::from("fmt-1")).unwrap().counter,
        Counter { helpful: 0, harmful: 1, neutral: 1 }
    );

    // Additions keep insertion order and start with zero counters.
    let contents: Vec<&str> = playbook.iter().map(|(_, b)| b.content.as_str()).collect();
    assert_eq!(contents[2], "Use the AC control box to find the upstairs bedroom");
    assert_eq!(contents[4], "Start from the master bedroom door");
    for (_, bullet) in playbook.iter().skip(2) {
        assert_eq!(bullet.counter, Counter::default());
        assert_eq!(bullet.section, "navigation");
    }
}

#[tokio::test]
async fn e2e_ground_truth_only_reaches_the_reflector() {
    let task = house_task();
    let provider = Arc::new(ScriptedProvider::new(vec![
        generator(&[], "Master Bedroom -> Living Room"),
        reflector(&[]),
        curator(&["Follow the stairs to the upper living room"]),
    ]));
    let mut ace = PlaybookLoop::new(provider.clone(), "e2e-model");
    ace.run_iteration(&task).await.unwrap();

    assert!(!provider.user_message(0).contains(&task.ground_truth));
    assert!(provider.user_message(1).contains(&task.ground_truth));
    assert!(!provider.user_message(2).contains(&task.ground_truth));
    // Every role sees the user's query.
    for call in 0..3 {
        assert!(provider.user_message(call).contains("linkedlist format"));
    }
}

#[tokio::test]
async fn e2e_hallucinated_bullet_aborts_without_mutation() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        generator(&["nav-1"], "a"),
        reflector(&[("nav-1", "helpful"), ("nav-99", "harmful")]),
    ]));
    let mut ace = PlaybookLoop::new(provider.clone(), "e2e-model").with_playbook(seeded_playbook());

    let err = ace.run_iteration(&house_task()).await.unwrap_err();

    assert!(matches!(err, Error::Playbook(PlaybookError::UnknownBullet(_))));
    assert_eq!(provider.calls(), 2);
    assert_eq!(ace.playbook().len(), 2);
    assert!(ace.playbook().iter().all(|(_, b)| b.counter == Counter::default()));
}

#[tokio::test]
async fn e2e_task_file_round_trip_into_loop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("task.toml");
    std::fs::write(
        &path,
        concat!(
            "system_prompt = \"You answer geography questions\"\n",
            "user_prompt = \"Which river runs through Vienna?\"\n",
            "ground_truth = \"The Danube\"\n",
        ),
    )
    .unwrap();

    let task = TaskFile::load_from(&path).unwrap();
    assert_eq!(
        task.context,
        TaskContext::new("You answer geography questions", "Which river runs through Vienna?")
    );

    let provider = Arc::new(ScriptedProvider::new(vec![
        generator(&[], "The Rhine"),
        reflector(&[]),
        curator(&["Check which capital each river flows through"]),
    ]));
    let mut ace = PlaybookLoop::new(provider.clone(), "e2e-model");
    let report = ace.run_iteration(&task).await.unwrap();

    assert_eq!(report.generator.final_answer, "The Rhine");
    assert!(provider.user_message(1).contains("The Danube"));
    assert_eq!(ace.playbook().len(), 1);
}

#[tokio::test]
async fn e2e_playbook_json_keeps_insertion_order() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        generator(&["fmt-1"], "a"),
        reflector(&[("fmt-1", "helpful")]),
        curator(&["Z: added last"]),
    ]));
    let mut ace = PlaybookLoop::new(provider, "e2e-model").with_playbook(seeded_playbook());
    ace.run_iteration(&house_task()).await.unwrap();

    let json = serde_json::to_string_pretty(ace.playbook()).unwrap();
    let nav = json.find("\"nav-1\"").unwrap();
    let fmt = json.find("\"fmt-1\"").unwrap();
    let added = json.find("Z: added last").unwrap();
    assert!(nav < fmt && fmt < added);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["fmt-1"]["counter"]["helpful"], 1);
    assert_eq!(value["nav-1"]["content"], "The stairs connect the two living rooms");
}

// ── HTTP gateway ─────────────────────────────────────────────────────────

/// Serve one chat-completion response per connection, in order, returning
/// the base URL and a handle yielding the raw requests received.
async fn scripted_server(contents: Vec<String>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for content in contents {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 8192];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
            }

            let body = serde_json::json!({
                "id": "chatcmpl-e2e",
                "model": "served-model",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop",
                }],
                "usage": {"prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60},
            })
            .to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            seen.push(String::from_utf8_lossy(&buf).to_string());
        }
        seen
    });

    (format!("http://{addr}/v1"), handle)
}

#[tokio::test]
async fn e2e_configured_gateway_runs_full_iteration() {
    let (base_url, server) = scripted_server(vec![
        generator(&[], "Master Bedroom -> Living Room"),
        reflector(&[]),
        curator(&["Go through the upper living room"]),
    ])
    .await;

    let mut config = AppConfig::default();
    config.default_provider = "homelab".into();
    config.default_temperature = 0.2;
    config.default_max_tokens = Some(512);
    config.providers.insert(
        "homelab".into(),
        ProviderConfig {
            api_key: None,
            api_url: Some(base_url),
            default_model: Some("qwen-local".into()),
        },
    );

    let router = ace_providers::router::build_from_config(&config).unwrap();
    let provider = router.default().unwrap();
    assert_eq!(provider.name(), "homelab");

    let client = RoleClient::new(provider, config.model())
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);
    let mut ace = PlaybookLoop::from_client(client);
    let report = ace.run_iteration(&house_task()).await.unwrap();

    assert_eq!(report.usage.total_tokens, 180);
    assert_eq!(report.bullets_added.len(), 1);
    assert_eq!(ace.playbook().len(), 1);

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 3);
    for raw in &requests {
        assert!(raw.starts_with("POST /v1/chat/completions"));
        assert!(raw.contains("\"model\":\"qwen-local\""));
        assert!(raw.contains("\"max_tokens\":512"));
        assert!(!raw.to_lowercase().contains("authorization:"));
    }
}

#[tokio::test]
async fn e2e_unknown_provider_without_url_is_not_configured() {
    let mut config = AppConfig::default();
    config.default_provider = "nowhere".into();

    let err = ace_providers::router::build_from_config(&config).err().unwrap();
    assert!(matches!(err, ProviderError::NotConfigured(_)));
}

#[tokio::test]
async fn e2e_config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.default_provider, "lmstudio");
    assert_eq!(config.loop_config.iterations, 5);
    assert!(config.loop_config.show_progress);

    let router = ace_providers::router::build_from_config(&config).unwrap();
    assert_eq!(router.list(), vec!["lmstudio"]);
}
