use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reel_app::runner::{run_pipeline, RunOutcome};
use reel_core::{Stage, StageFault};
use reel_engine::{EngineConfig, EngineHandle, PollConfig};

/// Engine config pointed at the mock server, with polling tightened so the
/// tests finish quickly.
fn test_config(server: &MockServer) -> EngineConfig {
    let mut config = EngineConfig::new(server.uri(), server.uri());
    config.media.base_url = Some(server.uri());
    let fast = PollConfig::new(Duration::from_millis(25), Duration::from_secs(5));
    config.summary_poll = fast;
    config.render_poll = fast;
    config.artifact_poll = fast;
    config
}

async fn run(server: &MockServer, url: &str, preview_only: bool) -> RunOutcome {
    let engine = EngineHandle::new(test_config(server)).expect("engine");
    let url = url.to_string();
    tokio::task::spawn_blocking(move || run_pipeline(&engine, url, preview_only))
        .await
        .expect("join")
}

#[tokio::test(flavor = "multi_thread")]
async fn full_pipeline_renders_after_artifact_probe_confirms() {
    let server = MockServer::start().await;

    // Extract+Summarize answers synchronously.
    Mock::given(method("POST"))
        .and(path("/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "T",
            "bullets": [{"text": "h1", "image_url": []}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Render hands back an async job.
    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"job_id": "J1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Status: processing twice, then completed.
    Mock::given(method("GET"))
        .and(path("/status/J1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "processing"})),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/J1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "completed"})),
        )
        .mount(&server)
        .await;

    // Artifact: absent once, then present.
    Mock::given(method("HEAD"))
        .and(path("/output_videos/J1.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/output_videos/J1.mp4"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = run(&server, "https://x.test/a", false).await;
    assert_eq!(
        outcome,
        RunOutcome::Rendered {
            media_id: "J1".to_string(),
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn async_summary_is_polled_to_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summary"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"job_id": "S1"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/status/S1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "processing"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/S1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed",
            "result": {"title": "T", "bullets": [{"text": "h1", "image_url": []}]}
        })))
        .mount(&server)
        .await;

    let outcome = run(&server, "https://x.test/a", true).await;
    assert_eq!(
        outcome,
        RunOutcome::Preview {
            title: "T".to_string(),
            highlights: 1,
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_submit_faults_the_stage_without_retrying() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summary"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = run(&server, "https://x.test/a", false).await;
    let RunOutcome::Faulted { stage, fault } = outcome else {
        panic!("expected fault, got {outcome:?}");
    };
    assert_eq!(stage, Stage::Summarize);
    let StageFault::Failed(reason) = fault else {
        panic!("expected failure, got timeout");
    };
    assert!(reason.contains("500"));
}
