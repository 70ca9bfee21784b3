//! Batch driver and the presentation-layer event contract
//!
//! A [`ScanDriver`] advances one engine by at most `batch_size` steps per
//! tick and then yields, so any cooperative scheduler (a frame callback, a
//! timer, a plain loop) can pace the scan. A [`ScanSession`] refuses to start
//! a new run while the current one is unfinished.

use crate::engine::Counters;
use crate::utils::expected_scan_rate;
use crate::{
    GridBloomError, GroundTruthSet, Outcome, Result, SimulationConfig, SimulationEngine,
    StepEvent,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Receiver of scan events. Every method defaults to a no-op.
///
/// `on_hit` fires for true positives and `on_miss` for false positives. This
/// differs from the counters: [`ScanReport::hits`] counts true negatives.
pub trait ScanObserver {
    /// Called once with the inserted cells, before any step
    fn on_cells_added(&mut self, _keys: &GroundTruthSet) {}

    /// A cell the filter reported as present that really is present
    fn on_hit(&mut self, _x: u32, _y: u32) {}

    /// A cell the filter reported as present that was never added
    fn on_miss(&mut self, _x: u32, _y: u32) {}

    /// Called after every batch
    fn on_progress(&mut self, _report: &ScanReport) {}

    /// Called once, after the batch that scans the last cell
    fn on_complete(&mut self, _report: &ScanReport) {}
}

impl ScanObserver for () {}

/// Counters snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub checks: u64,
    /// True negatives
    pub hits: u64,
    /// False positives
    pub misses: u64,
    /// `misses / checks * 100`, only once `checks > 0` and `misses > 0`
    pub false_positive_rate: Option<f64>,
    /// Theoretical value of `false_positive_rate` for a full scan
    pub expected_rate: f64,
    pub complete: bool,
}

impl ScanReport {
    fn new(counters: Counters, expected_rate: f64, complete: bool) -> Self {
        ScanReport {
            checks: counters.checks,
            hits: counters.hits,
            misses: counters.misses,
            false_positive_rate: counters.false_positive_rate(),
            expected_rate,
            complete,
        }
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "checks: {} correct: {} false: {}",
            self.checks, self.hits, self.misses
        )?;
        if let Some(rate) = self.false_positive_rate {
            write!(f, " false positive rate: {:.2}%", rate)?;
        }
        Ok(())
    }
}

/// Result of one tick
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub events: Vec<StepEvent>,
    pub report: ScanReport,
}

/// Drives a single engine to completion in bounded batches
pub struct ScanDriver {
    engine: SimulationEngine,
    batch_size: usize,
    expected_rate: f64,
    finished: bool,
}

impl ScanDriver {
    /// Wrap an engine; nothing is emitted yet
    pub fn new(engine: SimulationEngine, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(GridBloomError::InvalidParameter(
                "Batch size must be > 0".to_string(),
            ));
        }
        let expected_rate = expected_scan_rate(engine.config());
        Ok(ScanDriver {
            engine,
            batch_size,
            expected_rate,
            finished: false,
        })
    }

    /// Build an engine from `config` and announce its cells to `observer`
    pub fn start(config: &SimulationConfig, observer: &mut dyn ScanObserver) -> Result<Self> {
        let driver = ScanDriver::new(SimulationEngine::new(config)?, config.batch_size)?;
        info!(
            grid_side = config.grid_side,
            hash_count = config.hash_count,
            item_count = config.item_count,
            filter_bits = config.filter_bits,
            batch_size = config.batch_size,
            "Starting scan"
        );
        observer.on_cells_added(driver.engine.ground_truth());
        Ok(driver)
    }

    /// Run one bounded batch and report it. A tick after completion is a no-op
    /// returning an empty batch.
    pub fn tick(&mut self, observer: &mut dyn ScanObserver) -> BatchReport {
        if self.finished {
            return BatchReport {
                events: Vec::new(),
                report: self.report(),
            };
        }

        let events = self.engine.step_batch(self.batch_size);
        for event in &events {
            match event.outcome {
                Outcome::TruePositive => observer.on_hit(event.key.x, event.key.y),
                Outcome::FalsePositive => observer.on_miss(event.key.x, event.key.y),
                Outcome::TrueNegative => {}
            }
        }

        self.finished = self.engine.is_complete();
        let report = self.report();
        debug!(steps = events.len(), checks = report.checks, "Batch done");
        observer.on_progress(&report);

        if self.finished {
            info!(
                checks = report.checks,
                hits = report.hits,
                misses = report.misses,
                rate = report.false_positive_rate.unwrap_or(0.0),
                expected = report.expected_rate,
                "Scan complete"
            );
            observer.on_complete(&report);
        }

        BatchReport { events, report }
    }

    /// Tick until the whole grid is scanned; returns the final report
    pub fn run_to_completion(&mut self, observer: &mut dyn ScanObserver) -> ScanReport {
        while !self.finished {
            self.tick(observer);
        }
        self.report()
    }

    pub fn report(&self) -> ScanReport {
        ScanReport::new(self.engine.counters(), self.expected_rate, self.finished)
    }

    pub fn is_complete(&self) -> bool {
        self.finished
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }
}

/// Holds at most one run and guards against overlapping starts
#[derive(Default)]
pub struct ScanSession {
    driver: Option<ScanDriver>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a started run has cells left to scan
    pub fn is_running(&self) -> bool {
        self.driver.as_ref().map_or(false, |d| !d.is_complete())
    }

    /// Start a fresh run, replacing a finished one.
    ///
    /// Fails with [`GridBloomError::ScanInProgress`] while a run is unfinished,
    /// and leaves the previous state untouched on any error.
    pub fn start(
        &mut self,
        config: &SimulationConfig,
        observer: &mut dyn ScanObserver,
    ) -> Result<()> {
        if self.is_running() {
            warn!("Rejecting start while a scan is in progress");
            return Err(GridBloomError::ScanInProgress);
        }
        self.driver = Some(ScanDriver::start(config, observer)?);
        Ok(())
    }

    /// Advance the current run by one batch; `None` when idle
    pub fn tick(&mut self, observer: &mut dyn ScanObserver) -> Option<BatchReport> {
        match self.driver.as_mut() {
            Some(driver) if !driver.is_complete() => Some(driver.tick(observer)),
            _ => None,
        }
    }

    pub fn driver(&self) -> Option<&ScanDriver> {
        self.driver.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        added: usize,
        added_calls: usize,
        hits: Vec<(u32, u32)>,
        misses: Vec<(u32, u32)>,
        progress: Vec<ScanReport>,
        completed: usize,
    }

    impl ScanObserver for Recorder {
        fn on_cells_added(&mut self, keys: &GroundTruthSet) {
            self.added = keys.len();
            self.added_calls += 1;
        }
        fn on_hit(&mut self, x: u32, y: u32) {
            self.hits.push((x, y));
        }
        fn on_miss(&mut self, x: u32, y: u32) {
            self.misses.push((x, y));
        }
        fn on_progress(&mut self, report: &ScanReport) {
            self.progress.push(report.clone());
        }
        fn on_complete(&mut self, _report: &ScanReport) {
            self.completed += 1;
        }
    }

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            grid_side: 25,
            item_count: 60,
            filter_bits: 256,
            hash_count: 2,
            batch_size: 100,
            seed: Some(3),
        }
    }

    #[test]
    fn test_batches_are_bounded() {
        let mut recorder = Recorder::default();
        let mut driver = ScanDriver::start(&small_config(), &mut recorder).unwrap();
        assert_eq!(recorder.added_calls, 1);
        assert_eq!(recorder.added, 60);
        assert!(recorder.progress.is_empty());

        let mut sizes = Vec::new();
        while !driver.is_complete() {
            sizes.push(driver.tick(&mut recorder).events.len());
        }
        // 625 cells in batches of 100
        assert_eq!(sizes, vec![100, 100, 100, 100, 100, 100, 25]);
        assert_eq!(recorder.progress.len(), 7);
        assert_eq!(recorder.completed, 1);
        assert!(recorder.progress.last().unwrap().complete);
    }

    #[test]
    fn test_events_match_counters() {
        let mut recorder = Recorder::default();
        let mut driver = ScanDriver::start(&small_config(), &mut recorder).unwrap();
        let report = driver.run_to_completion(&mut recorder);

        assert_eq!(report.checks, 625);
        // Every inserted cell is reported as a hit event
        assert_eq!(recorder.hits.len(), 60);
        assert_eq!(recorder.misses.len() as u64, report.misses);
        assert_eq!(report.hits + report.misses + 60, report.checks);
        for &(x, y) in &recorder.misses {
            assert!(!driver.engine().ground_truth().contains(&crate::GridKey::new(x, y)));
        }
    }

    #[test]
    fn test_tick_after_completion_is_noop() {
        let mut recorder = Recorder::default();
        let mut driver = ScanDriver::start(&small_config(), &mut recorder).unwrap();
        let done = driver.run_to_completion(&mut recorder);
        let progress_calls = recorder.progress.len();

        let again = driver.tick(&mut recorder);
        assert!(again.events.is_empty());
        assert_eq!(again.report, done);
        assert_eq!(recorder.progress.len(), progress_calls);
        assert_eq!(recorder.completed, 1);
    }

    #[test]
    fn test_rejects_zero_batch() {
        let engine = SimulationEngine::new(&small_config()).unwrap();
        assert!(ScanDriver::new(engine, 0).is_err());
    }

    #[test]
    fn test_session_guards_overlapping_starts() {
        let mut session = ScanSession::new();
        assert!(!session.is_running());
        assert!(session.tick(&mut ()).is_none());

        session.start(&small_config(), &mut ()).unwrap();
        assert!(session.is_running());
        assert_eq!(
            session.start(&small_config(), &mut ()),
            Err(GridBloomError::ScanInProgress)
        );

        while session.tick(&mut ()).is_some() {}
        assert!(!session.is_running());
        assert_eq!(session.driver().unwrap().report().checks, 625);

        // Restart replaces the finished run entirely
        session.start(&small_config(), &mut ()).unwrap();
        assert_eq!(session.driver().unwrap().report().checks, 0);
    }

    #[test]
    fn test_session_keeps_state_on_bad_config() {
        let mut session = ScanSession::new();
        session.start(&small_config(), &mut ()).unwrap();
        while session.tick(&mut ()).is_some() {}

        let bad = SimulationConfig {
            item_count: 626,
            ..small_config()
        };
        assert!(session.start(&bad, &mut ()).is_err());
        assert_eq!(session.driver().unwrap().report().checks, 625);
    }

    #[test]
    fn test_report_display() {
        let report = ScanReport {
            checks: 22500,
            hits: 22390,
            misses: 10,
            false_positive_rate: Some(10.0 / 22500.0 * 100.0),
            expected_rate: 0.2,
            complete: true,
        };
        assert_eq!(
            report.to_string(),
            "checks: 22500 correct: 22390 false: 10 false positive rate: 0.04%"
        );

        let quiet = ScanReport {
            misses: 0,
            false_positive_rate: None,
            ..report
        };
        assert_eq!(quiet.to_string(), "checks: 22500 correct: 22390 false: 0");
    }
}
