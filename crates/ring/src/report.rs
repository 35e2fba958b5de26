//! Per-worker latency samples and the efficiency report built from them.

use arbiter_types::WorkerId;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Latest latencies recorded by one worker.
///
/// Written only by the worker's own task; read by whoever builds a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerSample {
    /// Time from announcing the wait to holding both resources, last cycle.
    pub wait: Option<Duration>,

    /// Time both resources were held, last cycle.
    pub service: Option<Duration>,

    /// Cycles completed.
    pub cycles: u64,
}

impl WorkerSample {
    pub fn new(wait: Duration, service: Duration) -> Self {
        Self {
            wait: Some(wait),
            service: Some(service),
            cycles: 1,
        }
    }

    fn has_data(&self) -> bool {
        self.wait.is_some() || self.service.is_some()
    }
}

/// Shared board of per-worker samples.
#[derive(Debug)]
pub struct LatencyBoard {
    samples: Mutex<Vec<WorkerSample>>,
}

impl LatencyBoard {
    pub fn new(num_workers: usize) -> Self {
        Self {
            samples: Mutex::new(vec![WorkerSample::default(); num_workers]),
        }
    }

    pub fn record_wait(&self, worker: WorkerId, wait: Duration) {
        self.samples.lock()[worker.index()].wait = Some(wait);
    }

    /// Record the service latency, completing the worker's cycle.
    pub fn record_service(&self, worker: WorkerId, service: Duration) {
        let mut samples = self.samples.lock();
        let sample = &mut samples[worker.index()];
        sample.service = Some(service);
        sample.cycles += 1;
    }

    /// Copy of every worker's latest sample, by worker id.
    pub fn snapshot(&self) -> Vec<WorkerSample> {
        self.samples.lock().clone()
    }

    /// Report over the current samples.
    pub fn report(&self) -> Option<EfficiencyReport> {
        efficiency_report(&self.snapshot())
    }
}

/// Totals and per-worker averages of the latest samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EfficiencyReport {
    pub workers: usize,
    pub total_wait: Duration,
    pub total_service: Duration,
    pub average_wait: Duration,
    pub average_service: Duration,
}

/// Aggregate the latest samples of every worker.
///
/// Averages divide by the number of workers; a worker that has not recorded
/// a latency yet contributes zero. Returns `None` when no worker has
/// recorded anything.
pub fn efficiency_report(samples: &[WorkerSample]) -> Option<EfficiencyReport> {
    if !samples.iter().any(WorkerSample::has_data) {
        return None;
    }

    let total_wait: Duration = samples.iter().filter_map(|s| s.wait).sum();
    let total_service: Duration = samples.iter().filter_map(|s| s.service).sum();
    let n = samples.len() as u32;

    Some(EfficiencyReport {
        workers: samples.len(),
        total_wait,
        total_service,
        average_wait: total_wait / n,
        average_service: total_service / n,
    })
}

impl fmt::Display for EfficiencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Efficiency report ({} workers)", self.workers)?;
        writeln!(f, "  Total waiting time:   {:.2} s", self.total_wait.as_secs_f64())?;
        writeln!(f, "  Total service time:   {:.2} s", self.total_service.as_secs_f64())?;
        writeln!(f, "  Average waiting time: {:.2} s", self.average_wait.as_secs_f64())?;
        write!(f, "  Average service time: {:.2} s", self.average_service.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_aggregation() {
        let samples = [
            WorkerSample::new(secs(2.0), secs(5.0)),
            WorkerSample::new(secs(3.0), secs(7.0)),
        ];
        let report = efficiency_report(&samples).unwrap();

        assert_eq!(report.total_wait, secs(5.0));
        assert_eq!(report.total_service, secs(12.0));
        assert_eq!(report.average_wait, secs(2.5));
        assert_eq!(report.average_service, secs(6.0));
    }

    #[test]
    fn test_no_data() {
        assert_eq!(efficiency_report(&[WorkerSample::default(); 3]), None);
        assert_eq!(efficiency_report(&[]), None);
    }

    #[test]
    fn test_partial_data_averages_over_all_workers() {
        let samples = [
            WorkerSample {
                wait: Some(secs(4.0)),
                service: None,
                cycles: 0,
            },
            WorkerSample::default(),
        ];
        let report = efficiency_report(&samples).unwrap();
        assert_eq!(report.average_wait, secs(2.0));
        assert_eq!(report.total_service, Duration::ZERO);
    }

    #[test]
    fn test_board_keeps_latest_sample() {
        let board = LatencyBoard::new(2);
        assert!(board.report().is_none());

        board.record_wait(WorkerId(0), secs(1.0));
        board.record_service(WorkerId(0), secs(7.5));
        board.record_wait(WorkerId(0), secs(3.0));

        let samples = board.snapshot();
        assert_eq!(samples[0].wait, Some(secs(3.0)));
        assert_eq!(samples[0].service, Some(secs(7.5)));
        assert_eq!(samples[0].cycles, 1);
        assert_eq!(samples[1], WorkerSample::default());
    }
}
