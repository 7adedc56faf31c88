// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mw_adapters::{FakeReply, FakeStatusAdapter};
use mw_core::{QueryError, RestartPolicy};

fn machine() -> Machine {
    Machine::new("my-app", "148ed193b95089")
}

/// Gaps between consecutive recorded calls
fn call_gaps(fake: &FakeStatusAdapter) -> Vec<Duration> {
    let calls = fake.calls();
    calls.windows(2).map(|w| w[1].at - w[0].at).collect()
}

fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(10),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_action_makes_no_calls() {
    let fake = FakeStatusAdapter::new();
    let waiter = Waiter::new(fake.clone());

    let result = waiter
        .wait_for(&machine(), "restart", Duration::from_secs(5), &CancellationToken::new())
        .await;

    assert_eq!(result, Err(WaitError::InvalidAction("restart".to_string())));
    assert_eq!(fake.call_count(), 0);
}

async fn assert_action_waits_for(action: &str, state: TargetState) {
    let fake = FakeStatusAdapter::new();
    fake.reply(state.clone(), FakeReply::Ok);
    let waiter = Waiter::new(fake.clone());

    let reached = waiter
        .wait_for(&machine(), action, Duration::from_secs(5), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(reached, state);
    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].state, state);
    assert_eq!(calls[0].timeout, DEFAULT_ATTEMPT_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn start_waits_for_started() {
    assert_action_waits_for("start", TargetState::started()).await;
}

#[tokio::test(start_paused = true)]
async fn stop_waits_for_stopped() {
    assert_action_waits_for("stop", TargetState::stopped()).await;
}

#[tokio::test(start_paused = true)]
async fn validated_action_waits_for_its_state() {
    let fake = FakeStatusAdapter::new();
    fake.reply("stopped", FakeReply::Ok);
    let waiter = Waiter::new(fake.clone());

    let reached = waiter
        .wait_for_action(
            &machine(),
            WaitAction::Stop,
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(reached, Ok(TargetState::stopped()));
    assert_eq!(fake.calls_for(&TargetState::stopped()).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn huge_timeout_is_accepted() {
    let fake = FakeStatusAdapter::new();
    fake.script("started", [FakeReply::transient("503"), FakeReply::Ok]);
    let waiter = Waiter::new(fake.clone());
    let three_hundred_billion_years = Duration::from_secs(300_000_000_000 * 365 * 86400);

    let reached = waiter
        .wait_for(
            &machine(),
            "start",
            three_hundred_billion_years,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(reached, Ok(TargetState::started()));
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_are_retried_with_growing_backoff() {
    let fake = FakeStatusAdapter::new();
    fake.script(
        "started",
        [
            FakeReply::transient("502 bad gateway"),
            FakeReply::transient("502 bad gateway"),
            FakeReply::transient("connection reset"),
            FakeReply::Ok,
        ],
    );
    let waiter = Waiter::new(fake.clone());

    let reached = waiter
        .wait_for(&machine(), "start", Duration::from_secs(60), &CancellationToken::new())
        .await;

    assert_eq!(reached, Ok(TargetState::started()));
    assert_eq!(fake.call_count(), 4);

    let gaps = call_gaps(&fake);
    assert_close(gaps[0], Duration::from_millis(500));
    assert_close(gaps[1], Duration::from_secs(1));
    assert_close(gaps[2], Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn backoff_is_capped_at_max() {
    let fake = FakeStatusAdapter::new();
    let mut script: Vec<FakeReply> = (0..6).map(|_| FakeReply::transient("503")).collect();
    script.push(FakeReply::Ok);
    fake.script("stopped", script);
    let waiter = Waiter::new(fake.clone());

    waiter
        .wait_for(&machine(), "stop", Duration::from_secs(60), &CancellationToken::new())
        .await
        .unwrap();

    let gaps = call_gaps(&fake);
    assert_eq!(gaps.len(), 6);
    for pair in gaps.windows(2) {
        assert!(pair[1] + Duration::from_millis(10) >= pair[0], "{:?}", gaps);
    }
    for gap in &gaps[2..] {
        assert_close(*gap, Duration::from_secs(2));
    }
}

#[tokio::test(start_paused = true)]
async fn deadline_exceeded_everywhere_times_out() {
    let fake = FakeStatusAdapter::new();
    fake.reply("started", FakeReply::Err(QueryError::DeadlineExceeded));
    let waiter = Waiter::new(fake.clone());
    let timeout = Duration::from_secs(5);

    let start = Instant::now();
    let result = waiter
        .wait_for(&machine(), "start", timeout, &CancellationToken::new())
        .await;
    let elapsed = start.elapsed();

    match result {
        Err(WaitError::TimedOut {
            machine_id,
            desired_state,
            timeout: reported,
        }) => {
            assert_eq!(machine_id.0, "148ed193b95089");
            assert_eq!(desired_state, TargetState::started());
            assert_eq!(reported, timeout);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(elapsed >= timeout, "{:?}", elapsed);
    assert!(elapsed <= timeout + Duration::from_secs(2), "{:?}", elapsed);
    assert!(fake.call_count() > 1);
}

#[tokio::test(start_paused = true)]
async fn stuck_query_is_cut_off_by_overall_timeout() {
    let fake = FakeStatusAdapter::new();
    fake.reply(
        "started",
        FakeReply::after(Duration::from_secs(60), FakeReply::Err(QueryError::DeadlineExceeded)),
    );
    let waiter = Waiter::new(fake.clone());

    let start = Instant::now();
    let outcome = waiter
        .wait_for_outcome(&machine(), "start", Duration::from_secs(5), &CancellationToken::new())
        .await;

    assert!(matches!(outcome, WaitOutcome::TimedOut { .. }), "{:?}", outcome);
    assert_close(start.elapsed(), Duration::from_secs(5));
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn restart_policy_no_makes_unreachable_terminal() {
    let fake = FakeStatusAdapter::new();
    fake.reply(
        "started",
        FakeReply::Err(QueryError::Unreachable {
            message: "failed to reach desired state".to_string(),
        }),
    );
    let waiter = Waiter::new(fake.clone());
    let machine = machine().with_restart_policy(RestartPolicy::No);

    let start = Instant::now();
    let result = waiter
        .wait_for(&machine, "start", Duration::from_secs(60), &CancellationToken::new())
        .await;

    assert_eq!(
        result,
        Err(WaitError::RestartForbidden {
            desired_state: TargetState::started(),
            policy: RestartPolicy::No,
        })
    );
    assert_eq!(fake.call_count(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn unreachable_is_retried_when_restarts_allowed() {
    let fake = FakeStatusAdapter::new();
    fake.script(
        "started",
        [
            FakeReply::Err(QueryError::Unreachable {
                message: "failed to reach desired state".to_string(),
            }),
            FakeReply::Ok,
        ],
    );
    let waiter = Waiter::new(fake.clone());
    let machine = machine().with_restart_policy(RestartPolicy::Always);

    let result = waiter
        .wait_for(&machine, "start", Duration::from_secs(60), &CancellationToken::new())
        .await;

    assert_eq!(result, Ok(TargetState::started()));
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn bad_request_is_not_retried() {
    let fake = FakeStatusAdapter::new();
    let rejection = QueryError::BadRequest {
        status: 400,
        message: "invalid instance_id".to_string(),
    };
    fake.reply("stopped", FakeReply::Err(rejection.clone()));
    let waiter = Waiter::new(fake.clone());

    let result = waiter
        .wait_for(&machine(), "stop", Duration::from_secs(60), &CancellationToken::new())
        .await;

    assert_eq!(result, Err(WaitError::Rejected(rejection)));
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn caller_cancel_stops_waiting() {
    let fake = FakeStatusAdapter::new();
    let waiter = Waiter::new(fake.clone());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let outcome = waiter
        .wait_for_outcome(&machine(), "start", Duration::from_secs(60), &cancel)
        .await;

    assert_eq!(outcome, WaitOutcome::Canceled);
    assert_close(start.elapsed(), Duration::from_secs(1));
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_backoff_stops_retrying() {
    let fake = FakeStatusAdapter::new();
    fake.reply("started", FakeReply::transient("503"));
    let waiter = Waiter::new(fake.clone()).with_backoff(BackoffPolicy {
        min: Duration::from_secs(10),
        max: Duration::from_secs(10),
        factor: 2.0,
    });
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let result = waiter
        .wait_for(&machine(), "start", Duration::from_secs(60), &cancel)
        .await;

    assert_eq!(result, Err(WaitError::Canceled));
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn config_sets_attempt_timeout_and_backoff() {
    let fake = FakeStatusAdapter::new();
    fake.script("started", [FakeReply::transient("503"), FakeReply::Ok]);
    let config = WaitConfig::from_toml_str(
        r#"
        attempt_timeout = "15s"

        [backoff]
        min = "3s"
        max = "10s"
        "#,
    )
    .unwrap();
    let waiter = Waiter::from_config(fake.clone(), &config);

    waiter
        .wait_for(&machine(), "start", Duration::from_secs(60), &CancellationToken::new())
        .await
        .unwrap();

    let calls = fake.calls();
    assert_eq!(calls[0].timeout, Duration::from_secs(15));
    assert_close(call_gaps(&fake)[0], Duration::from_secs(3));
}
