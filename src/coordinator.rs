//! Owns a simulation run from start to teardown: builds the shared balance and frame table,
//! runs one worker thread per transaction source plus the clock ticker, and reports.

use std::collections::HashSet;
use std::fmt::Display;
use std::panic;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{self, Error, Result};
use crate::paging::{ClockTicker, Frame, FrameTable, FrameTableApi as _};
use crate::shared::SimConfig;
use crate::sync::{BinarySemaphore, BinarySemaphoreMethods as _, Latch as _};
use crate::txn::{Grammar, SharedBalance, SharedState, TransactionSource, TransactionWorker, WorkerReport};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub final_balance: f64,
    pub workers: Vec<WorkerReport>,
    pub ticks: usize,
    /// the frame table as it stood just before teardown
    pub frames: Vec<Frame>,
    pub started_at: DateTime<Local>,
    pub elapsed: chrono::Duration,
}

impl SimulationReport {
    pub fn total_faults(&self) -> usize {
        self.workers.iter().map(|w| w.faults).sum()
    }

    pub fn total_sections(&self) -> usize {
        self.workers.iter().map(|w| w.sections).sum()
    }
}

impl Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Final account balance is ${:.2}", self.final_balance)
    }
}

pub struct Coordinator {
    sources: Vec<TransactionSource>,
    config: Arc<SimConfig>,
}

impl Coordinator {
    /// Worker names double as frame owner identities, so they must be unique
    pub fn new(sources: Vec<TransactionSource>, config: SimConfig) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::Config("no transaction sources given".to_string()));
        }
        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.name()) {
                return Err(Error::Config(format!(
                    "transaction source \"{}\" given more than once",
                    source.name()
                )));
            }
        }
        Ok(Coordinator {
            sources,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run(&self) -> Result<SimulationReport> {
        let started_at = Local::now();
        let grammar = Arc::new(self.fatal(Grammar::new())?);
        let names: Vec<String> = self.sources.iter().map(|s| s.name().to_string()).collect();

        let shared = SharedState {
            balance: SharedBalance::init(0.0),
            frames: FrameTable::create(&names),
            grammar,
            config: Arc::clone(&self.config),
        };
        let stop = BinarySemaphore::init(false);
        info!(
            "starting {} workers over {} frames",
            names.len(),
            shared.frames.frame_count()
        );

        let (outcomes, ticks) = thread::scope(|scope| -> Result<_> {
            let mut workers = Vec::with_capacity(self.sources.len());
            for (id, source) in self.sources.iter().enumerate() {
                let shared = shared.clone();
                let handle = thread::Builder::new()
                    .name(source.name().to_string())
                    .spawn_scoped(scope, move || {
                        let outcome = source.open().and_then(|stream| {
                            // the seeded table gives worker `id` frame `id + 1`
                            TransactionWorker::new(id, source.name(), stream, id + 1, shared).run()
                        });
                        self.fatal(outcome)
                    })
                    .map_err(Error::Spawn);
                workers.push(self.fatal(handle)?);
            }

            let ticker = ClockTicker::new(shared.frames.clone(), stop.clone(), self.config.tick_interval);
            let ticker = thread::Builder::new()
                .name("clock-tick".to_string())
                .spawn_scoped(scope, move || ticker.run())
                .map_err(Error::Spawn);
            let ticker = self.fatal(ticker)?;

            let outcomes: Vec<Result<WorkerReport>> = workers
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect();

            stop.post();
            let ticks = ticker
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload));
            Ok((outcomes, ticks))
        })?;

        let workers = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

        let frames = {
            let table = shared.frames.latch();
            table.snapshot()
        };
        let final_balance = *shared.balance.latch();
        drop(shared);
        debug!("frame table torn down after {} clock ticks", ticks);

        Ok(SimulationReport {
            final_balance,
            workers,
            ticks,
            frames,
            started_at,
            elapsed: Local::now() - started_at,
        })
    }

    /// Ends the process on error unless the run is configured to hand errors back
    fn fatal<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Err(err) if self.config.abort_on_fatal => error::abort(&err),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let sources = vec![
            TransactionSource::inline("Vlad", ""),
            TransactionSource::inline("Vlad", ""),
        ];
        assert!(matches!(
            Coordinator::new(sources, SimConfig::quiet()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn rejects_empty_roster() {
        assert!(Coordinator::new(vec![], SimConfig::quiet()).is_err());
    }

    #[test]
    fn report_display() {
        let report = SimulationReport {
            final_balance: -50.0,
            workers: vec![],
            ticks: 0,
            frames: vec![],
            started_at: Local::now(),
            elapsed: chrono::Duration::zero(),
        };
        assert_eq!(report.to_string(), "Final account balance is $-50.00");
    }
}
