//! Request governor behavior on a paused tokio clock

use futures::future::join_all;
use scalplab::governor::{COOLDOWN_PERIOD, GovernorError, MIN_REQUEST_GAP, RequestGovernor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, advance, sleep};

/// Dispatch log: (submission index, start offset, end offset)
type Log = Arc<Mutex<Vec<(usize, Duration, Duration)>>>;

fn ms(d: Duration) -> u128 {
    d.as_millis()
}

#[tokio::test(start_paused = true)]
async fn test_three_submissions_are_spaced_five_seconds_apart() {
    let governor = Arc::new(RequestGovernor::default());
    let origin = Instant::now();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let submissions = (0..3).map(|i| {
        let governor = governor.clone();
        let log = log.clone();
        async move {
            governor
                .submit(move || async move {
                    let start = origin.elapsed();
                    log.lock().unwrap().push((i, start, start));
                    Ok::<_, String>(i)
                })
                .await
        }
    });
    let results = join_all(submissions).await;

    let values: Vec<usize> = results.into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(values, vec![0, 1, 2]);

    let log = log.lock().unwrap();
    for (i, expected) in [0u128, 5_000, 10_000].into_iter().enumerate() {
        let start = ms(log[i].1);
        assert!(
            start >= expected && start < expected + 50,
            "dispatch {} started at {}ms, expected ~{}ms",
            i,
            start,
            expected
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_dispatches_never_overlap_and_keep_submission_order() {
    let governor = Arc::new(RequestGovernor::default());
    let origin = Instant::now();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let submissions = (0..5).map(|i| {
        let governor = governor.clone();
        let log = log.clone();
        let in_flight = in_flight.clone();
        let max_in_flight = max_in_flight.clone();
        async move {
            governor
                .submit(move || async move {
                    let start = origin.elapsed();
                    let now_in_flight = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
                    // Slow call: 7s, longer than the gap
                    sleep(Duration::from_millis(7_000)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    log.lock().unwrap().push((i, start, origin.elapsed()));
                    Ok::<_, String>(())
                })
                .await
        }
    });
    for result in join_all(submissions).await {
        result.unwrap();
    }

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);

    let log = log.lock().unwrap();
    let order: Vec<usize> = log.iter().map(|(i, _, _)| *i).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);

    for pair in log.windows(2) {
        let (_, prev_start, prev_end) = pair[0];
        let (_, next_start, _) = pair[1];
        assert!(next_start >= prev_end, "execution windows overlap");
        assert!(next_start - prev_start >= MIN_REQUEST_GAP);
    }
}

#[tokio::test(start_paused = true)]
async fn test_short_calls_still_respect_min_gap() {
    let governor = RequestGovernor::default();
    let origin = Instant::now();

    governor
        .submit(|| async { Ok::<_, String>(()) })
        .await
        .unwrap();
    // Caller comes back after 2s; must still wait until 5s
    advance(Duration::from_millis(2_000)).await;

    let started = governor
        .submit(|| async { Ok::<_, String>(origin.elapsed()) })
        .await
        .unwrap();
    assert!(started >= MIN_REQUEST_GAP);
    assert!(ms(started) < 5_050);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_opens_cooldown_and_rejects_without_calling() {
    let governor = RequestGovernor::default();

    let err = governor
        .submit(|| async { Err::<(), _>("API error 429 Too Many Requests".to_string()) })
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(
        err.into_inner().as_deref(),
        Some("API error 429 Too Many Requests")
    );

    let remaining = governor.remaining_cooldown_secs();
    assert!(remaining > 0 && remaining <= 65);

    let calls = AtomicUsize::new(0);
    let err = governor
        .submit(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GovernorError::CooldownActive(65)));

    advance(Duration::from_secs(30)).await;
    let err = governor
        .submit(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();
    assert_eq!(err.cooldown_secs(), Some(35));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resource_exhausted_cooldown_expires_lazily() {
    let governor = RequestGovernor::default();

    let _ = governor
        .submit(|| async { Err::<(), _>("status: RESOURCE_EXHAUSTED".to_string()) })
        .await;
    assert_eq!(governor.remaining_cooldown_secs(), 65);

    advance(COOLDOWN_PERIOD + Duration::from_millis(1)).await;
    assert_eq!(governor.remaining_cooldown_secs(), 0);
    // Repeated reads stay at zero
    assert_eq!(governor.remaining_cooldown_secs(), 0);

    let calls = AtomicUsize::new(0);
    governor
        .submit(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        })
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_submit_after_expiry_proceeds_without_oracle_read() {
    let governor = RequestGovernor::default();

    let _ = governor
        .submit(|| async { Err::<(), _>("quota exceeded".to_string()) })
        .await;
    advance(COOLDOWN_PERIOD).await;

    let value = governor
        .submit(|| async { Ok::<_, String>("fresh") })
        .await
        .unwrap();
    assert_eq!(value, "fresh");
    assert_eq!(governor.remaining_cooldown_secs(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_passes_through() {
    let governor = RequestGovernor::default();

    let err = governor
        .submit(|| async { Err::<(), _>("connection reset by peer".to_string()) })
        .await
        .unwrap_err();
    match err {
        GovernorError::Failed(message) => assert_eq!(message, "connection reset by peer"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(governor.remaining_cooldown_secs(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_unit_does_not_block_queue() {
    let governor = Arc::new(RequestGovernor::default());
    let origin = Instant::now();
    let b_calls = Arc::new(AtomicUsize::new(0));

    let a = {
        let governor = governor.clone();
        async move {
            governor
                .submit(|| async { Err::<Duration, _>("malformed response".to_string()) })
                .await
        }
    };
    let b = {
        let governor = governor.clone();
        let b_calls = b_calls.clone();
        async move {
            governor
                .submit(move || async move {
                    b_calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(origin.elapsed())
                })
                .await
        }
    };

    let (a, b) = tokio::join!(a, b);
    assert!(a.is_err());
    let b_started = b.unwrap();
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    // Failed dispatch still counts for spacing
    assert!(b_started >= MIN_REQUEST_GAP);
}

#[tokio::test(start_paused = true)]
async fn test_queued_submission_rejected_after_rate_limit() {
    let governor = Arc::new(RequestGovernor::default());
    let b_calls = Arc::new(AtomicUsize::new(0));

    let a = {
        let governor = governor.clone();
        async move {
            governor
                .submit(|| async { Err::<(), _>("429".to_string()) })
                .await
        }
    };
    let b = {
        let governor = governor.clone();
        let b_calls = b_calls.clone();
        async move {
            governor
                .submit(move || async move {
                    b_calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(())
                })
                .await
        }
    };

    let (a, b) = tokio::join!(a, b);
    assert!(a.unwrap_err().is_rate_limited());
    assert!(matches!(b, Err(GovernorError::CooldownActive(65))));
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_work_releases_queue() {
    let governor = Arc::new(RequestGovernor::default());

    let crashed = {
        let governor = governor.clone();
        tokio::spawn(async move {
            governor
                .submit(|| async {
                    if true {
                        panic!("work blew up");
                    }
                    Ok::<(), String>(())
                })
                .await
        })
    };
    assert!(crashed.await.unwrap_err().is_panic());

    let value = governor
        .submit(|| async { Ok::<_, String>(1) })
        .await
        .unwrap();
    assert_eq!(value, 1);
}

#[tokio::test(start_paused = true)]
async fn test_oracle_reads_do_not_disturb_spacing() {
    let governor = RequestGovernor::default();
    let origin = Instant::now();

    governor
        .submit(|| async { Ok::<_, String>(()) })
        .await
        .unwrap();
    for _ in 0..100 {
        assert_eq!(governor.remaining_cooldown_secs(), 0);
    }

    let started = governor
        .submit(|| async { Ok::<_, String>(origin.elapsed()) })
        .await
        .unwrap();
    assert!(started >= MIN_REQUEST_GAP);
}
