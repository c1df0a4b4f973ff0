use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use reel_engine::{
    run_poll_loop, AttemptSink, PollConfig, PollResult, ProbeOutcome, Prober, StageOutput,
};

/// Plays back a scripted probe sequence and records when each probe ran.
struct ScriptedProber {
    script: Mutex<VecDeque<ProbeOutcome>>,
    probed_at: Mutex<Vec<Instant>>,
}

impl ScriptedProber {
    fn new(script: Vec<ProbeOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            probed_at: Mutex::new(Vec::new()),
        }
    }

    fn probe_count(&self) -> usize {
        self.probed_at.lock().unwrap().len()
    }

    fn probe_times(&self) -> Vec<Instant> {
        self.probed_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self) -> ProbeOutcome {
        self.probed_at.lock().unwrap().push(Instant::now());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ProbeOutcome::Pending)
    }
}

/// A probe that never resolves; used to park the loop mid-probe.
struct StuckProber;

#[async_trait]
impl Prober for StuckProber {
    async fn probe(&self) -> ProbeOutcome {
        std::future::pending().await
    }
}

struct CountingSink {
    attempts: AtomicU32,
}

impl CountingSink {
    fn new() -> Self {
        Self {
            attempts: AtomicU32::new(0),
        }
    }
}

impl AttemptSink for CountingSink {
    fn attempted(&self, _attempts: u32) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
    }
}

fn done() -> ProbeOutcome {
    ProbeOutcome::Done(StageOutput::ArtifactReady {
        media_id: "J1".to_string(),
    })
}

#[tokio::test(start_paused = true)]
async fn pending_until_deadline_times_out_and_stops_probing() {
    // 5s interval, 30s budget: exactly six probes fit before the deadline.
    let config = PollConfig::new(Duration::from_secs(5), Duration::from_secs(30));
    let prober = ScriptedProber::new(Vec::new());
    let token = CancellationToken::new();
    let sink = CountingSink::new();

    let result = run_poll_loop(&prober, config, &token, &sink).await;

    assert_eq!(result, Some(PollResult::TimedOut));
    assert_eq!(prober.probe_count(), 6);
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn completes_at_the_probe_that_reports_done() {
    let config = PollConfig::new(Duration::from_secs(5), Duration::from_secs(300));
    let prober = ScriptedProber::new(vec![
        ProbeOutcome::Pending,
        ProbeOutcome::Pending,
        done(),
    ]);
    let token = CancellationToken::new();
    let sink = CountingSink::new();

    let result = run_poll_loop(&prober, config, &token, &sink).await;

    assert_eq!(
        result,
        Some(PollResult::Completed(StageOutput::ArtifactReady {
            media_id: "J1".to_string(),
        }))
    );
    assert_eq!(prober.probe_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn remote_failure_is_terminal() {
    let config = PollConfig::new(Duration::from_secs(3), Duration::from_secs(60));
    let prober = ScriptedProber::new(vec![
        ProbeOutcome::Pending,
        ProbeOutcome::Failed("render exploded".to_string()),
    ]);
    let token = CancellationToken::new();
    let sink = CountingSink::new();

    let result = run_poll_loop(&prober, config, &token, &sink).await;

    assert_eq!(
        result,
        Some(PollResult::Failed("render exploded".to_string()))
    );
    assert_eq!(prober.probe_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn interval_triples_from_the_seventh_attempt() {
    let config = PollConfig::new(Duration::from_secs(5), Duration::from_secs(3_600));
    let mut script = vec![ProbeOutcome::Pending; 8];
    script.push(done());
    let prober = ScriptedProber::new(script);
    let token = CancellationToken::new();
    let sink = CountingSink::new();

    let start = Instant::now();
    let result = run_poll_loop(&prober, config, &token, &sink).await;
    assert!(matches!(result, Some(PollResult::Completed(_))));

    let offsets: Vec<Duration> = prober
        .probe_times()
        .iter()
        .map(|at| *at - start)
        .collect();
    // Attempts 1-6 at the base interval, attempts 7+ at triple.
    let expected: Vec<Duration> = [5u64, 10, 15, 20, 25, 30, 45, 60, 75]
        .iter()
        .map(|s| Duration::from_secs(*s))
        .collect();
    assert_eq!(offsets, expected);
}

#[tokio::test(start_paused = true)]
async fn cancellation_before_the_first_tick_yields_nothing() {
    let config = PollConfig::new(Duration::from_secs(5), Duration::from_secs(30));
    let prober = ScriptedProber::new(vec![done()]);
    let token = CancellationToken::new();
    token.cancel();
    let sink = CountingSink::new();

    let result = run_poll_loop(&prober, config, &token, &sink).await;

    assert_eq!(result, None);
    assert_eq!(prober.probe_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_an_in_flight_probe_discards_the_result() {
    let config = PollConfig::new(Duration::from_secs(5), Duration::from_secs(300));
    let token = CancellationToken::new();
    let loop_token = token.clone();

    let handle = tokio::spawn(async move {
        run_poll_loop(&StuckProber, config, &loop_token, &reel_engine::NullAttemptSink).await
    });

    // Let the loop pass its first sleep and get stuck inside the probe.
    tokio::time::sleep(Duration::from_secs(6)).await;
    token.cancel();

    let result = handle.await.expect("join");
    assert_eq!(result, None);
}
