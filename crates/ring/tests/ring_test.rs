//! End-to-end ring scenarios on tokio's paused clock.

use arbiter_ring::{
    check_feasibility, AcquisitionPolicy, ClaimTable, NotificationSink, Ring, RingConfig,
    RingError, RingTiming,
};
use arbiter_test_helpers::{count_kind, seeded_rng};
use arbiter_types::Priority;
use rand::Rng;
use std::time::Duration;
use tokio::time::{sleep, timeout};

#[test]
fn test_feasibility_is_deterministic() {
    let mut rng = seeded_rng(17);
    for _ in 0..200 {
        let n = rng.gen_range(1..6);
        let max_claim: Vec<[u32; 2]> = (0..n)
            .map(|_| [rng.gen_range(0..4), rng.gen_range(0..4)])
            .collect();
        let allocated: Vec<[u32; 2]> = max_claim
            .iter()
            .map(|m| [rng.gen_range(0..=m[0]), rng.gen_range(0..=m[1])])
            .collect();
        let available = [rng.gen_range(0..3), rng.gen_range(0..3)];

        let first = check_feasibility(n, &max_claim, &allocated, available);
        let second = check_feasibility(n, &max_claim, &allocated, available);
        assert_eq!(first, second);
    }
}

#[test]
fn test_claims_beyond_capacity_are_unsafe() {
    for n in 1..8 {
        let table = ClaimTable::new(vec![[3, 1]; n], vec![[0, 0]; n], [2, 2]);
        assert!(!table.is_safe());
        assert!(table.safe_sequence().is_none());
    }
}

#[test]
fn test_safe_sequence_covers_every_worker_once() {
    let table = ClaimTable::new(
        vec![[1, 2], [2, 1], [1, 1], [0, 1]],
        vec![[1, 0], [0, 1], [0, 0], [0, 1]],
        [1, 1],
    );
    let mut sequence = table.safe_sequence().unwrap();
    sequence.sort();
    let ids: Vec<u32> = sequence.iter().map(|w| w.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_infeasible_plan_starts_nothing() {
    let (sink, mut rx) = NotificationSink::channel();
    let config = RingConfig::new(4).unwrap().with_cycles(1);
    let claims = ClaimTable::new(vec![[1, 1]; 4], vec![[0, 0]; 4], [0, 0]);

    let result = Ring::new(config).with_claims(claims).start(sink);
    assert!(matches!(result, Err(RingError::UnsafeAllocation)));
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_mismatched_plan_is_rejected() {
    let config = RingConfig::new(4).unwrap();
    let result = Ring::new(config)
        .with_claims(ClaimTable::for_ring(3))
        .start(NotificationSink::discard());
    assert!(matches!(result, Err(RingError::UnsafeAllocation)));
}

#[tokio::test(start_paused = true)]
async fn test_no_resource_held_twice() {
    for policy in [AcquisitionPolicy::GlobalGate, AcquisitionPolicy::OrderedPair] {
        for seed in 0..4 {
            let config = RingConfig::new(6)
                .unwrap()
                .with_policy(policy)
                .with_cycles(3)
                .with_seed(seed);
            let mut handle = Ring::new(config)
                .start(NotificationSink::discard())
                .unwrap();

            timeout(Duration::from_secs(3600), handle.join())
                .await
                .expect("ring stalled")
                .unwrap();

            assert_eq!(handle.violations(), 0, "{policy:?} seed {seed}");
            assert!(handle.samples().iter().all(|s| s.cycles == 3));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_neighbours_never_hold_together() {
    let timing = RingTiming {
        acquire_gap: Duration::from_millis(20),
        ..Default::default()
    };
    let config = RingConfig::new(5).unwrap().with_timing(timing);
    let handle = Ring::new(config).start(NotificationSink::discard()).unwrap();

    for _ in 0..400 {
        sleep(Duration::from_millis(250)).await;
        let holders = handle.holders();
        // Resource i belongs to worker i (left) or worker i-1 (right) only
        for (i, holder) in holders.iter().enumerate() {
            if let Some(worker) = holder {
                let w = worker.0 as usize;
                assert!(w == i || (w + 1) % 5 == i, "worker {w} holds resource {i}");
            }
        }
    }
    assert_eq!(handle.violations(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_report_after_bounded_run() {
    let (sink, mut rx) = NotificationSink::channel();
    let config = RingConfig::new(4).unwrap().with_cycles(2).with_seed(99);
    let mut handle = Ring::new(config).start(sink).unwrap();
    assert!(handle.report().is_none());

    handle.join().await.unwrap();
    let report = handle.report().unwrap();

    assert_eq!(report.workers, 4);
    assert!(report.average_service >= Duration::from_millis(7500));
    // Every wait includes at least the minimum contention delay.
    assert!(report.average_wait >= Duration::from_millis(500));
    let waits: Duration = handle.samples().iter().filter_map(|s| s.wait).sum();
    assert_eq!(report.total_wait, waits);

    drop(handle);
    let mut log = Vec::new();
    while let Some(timed) = rx.recv().await {
        log.push(timed);
    }
    assert_eq!(count_kind(&log, "WorkerWaiting"), 8);
    assert_eq!(count_kind(&log, "WorkerServiceDuration"), 8);
}

#[tokio::test(start_paused = true)]
async fn test_priorities_resolved_from_seed() {
    let config = RingConfig::new(3)
        .unwrap()
        .with_names(vec!["north".into(), "east".into()])
        .unwrap()
        .with_priority("east", 9)
        .unwrap()
        .with_cycles(1);

    let mut handle = Ring::new(config.clone())
        .start(NotificationSink::discard())
        .unwrap();
    let workers = handle.workers().to_vec();
    handle.shutdown().await;

    assert_eq!(workers[1].name, "east");
    assert_eq!(workers[1].priority, Priority(9));
    assert_eq!(workers[2].name, "worker-2");

    let again = Ring::new(config)
        .start(NotificationSink::discard())
        .unwrap();
    assert_eq!(again.workers(), workers.as_slice());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_unbounded_ring() {
    let config = RingConfig::new(3).unwrap();
    let mut handle = Ring::new(config).start(NotificationSink::discard()).unwrap();

    sleep(Duration::from_secs(30)).await;
    assert!(handle.report().is_some());

    handle.shutdown().await;
    handle.join().await.unwrap();
}
