//! The per-source transaction worker. Each section is applied to the shared balance under the
//! balance latch, then the worker's frames are reconciled, faulted in if needed, and touched
//! under the frame table latch. The latch order is always balance, then frame table.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::paging::{FrameTable, NruPolicy, OwnershipTracker, ReplacementPolicy};
use crate::shared::{FrameId, SimConfig, WorkerId, NANOS_PER_SEC};
use crate::sync::{Latch as _, Synchronized};
use crate::txn::grammar::{Grammar, Token};
use crate::txn::source::TransactionStream;

pub type SharedBalance = Synchronized<f64>;

/// Handles every worker shares
#[derive(Clone)]
pub struct SharedState {
    pub balance: SharedBalance,
    pub frames: FrameTable,
    pub grammar: Arc<Grammar>,
    pub config: Arc<SimConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    AwaitingSectionStart,
    ReadingSectionBody,
    Finished,
}

/// What a worker did over its whole input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub name: String,
    pub sections: usize,
    pub faults: usize,
    /// faults satisfied by taking a frame away from another worker
    pub evictions: usize,
    pub owned_frames: Vec<FrameId>,
}

pub struct TransactionWorker<P = NruPolicy> {
    id: WorkerId,
    name: String,
    stream: TransactionStream,
    shared: SharedState,
    tracker: OwnershipTracker,
    policy: P,
    rng: StdRng,
    state: WorkerState,
    report: WorkerReport,
}

impl TransactionWorker<NruPolicy> {
    pub fn new(
        id: WorkerId,
        name: impl Into<String>,
        stream: TransactionStream,
        initial_frame: FrameId,
        shared: SharedState,
    ) -> Self {
        TransactionWorker::with_policy(id, name, stream, initial_frame, shared, NruPolicy)
    }
}

impl<P: ReplacementPolicy> TransactionWorker<P> {
    pub fn with_policy(
        id: WorkerId,
        name: impl Into<String>,
        stream: TransactionStream,
        initial_frame: FrameId,
        shared: SharedState,
        policy: P,
    ) -> Self {
        let rng = match shared.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };
        let name = name.into();
        TransactionWorker {
            id,
            stream,
            shared,
            tracker: OwnershipTracker::new(id, initial_frame),
            policy,
            rng,
            state: WorkerState::AwaitingSectionStart,
            report: WorkerReport {
                name: name.clone(),
                ..Default::default()
            },
            name,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn owned_frames(&self) -> &[FrameId] {
        self.tracker.owned()
    }

    /// Drives the state machine until the input is exhausted
    pub fn run(mut self) -> Result<WorkerReport> {
        info!("{} thread started on \"{}\"", self.name, self.stream.source_name());
        while self.step()? != WorkerState::Finished {}
        {
            // frames can be taken by other workers after our last section
            let frames = self.shared.frames.clone();
            let table = frames.latch();
            self.tracker.reconcile(&table);
        }
        self.report.owned_frames = self.tracker.owned().to_vec();
        info!(
            "{} thread finished after {} sections ({} faults)",
            self.name, self.report.sections, self.report.faults
        );
        Ok(self.report)
    }

    /// Performs one transition
    pub fn step(&mut self) -> Result<WorkerState> {
        self.state = match self.state {
            WorkerState::AwaitingSectionStart => self.await_section_start()?,
            WorkerState::ReadingSectionBody => self.process_section()?,
            WorkerState::Finished => WorkerState::Finished,
        };
        Ok(self.state)
    }

    fn await_section_start(&mut self) -> Result<WorkerState> {
        let line = match self.stream.next_line()? {
            Some(line) => line,
            None => return Ok(WorkerState::Finished),
        };
        if self.shared.grammar.classify(&line) != Some(Token::BeginSection) {
            return Err(self.unexpected("a section start", line));
        }
        if self.report.sections > 0 {
            self.pause();
        }
        Ok(WorkerState::ReadingSectionBody)
    }

    /// Sleeps between sections to shuffle the order workers reach the balance latch
    fn pause(&mut self) {
        let config = &self.shared.config;
        if !config.section_delay {
            return;
        }
        let secs = if config.max_delay_secs > 0 {
            self.rng.gen_range(0..config.max_delay_secs)
        } else {
            0
        };
        let delay = Duration::new(secs, self.rng.gen_range(0..NANOS_PER_SEC));
        debug!("{} thread pausing for {:?}", self.name, delay);
        thread::sleep(delay);
    }

    fn process_section(&mut self) -> Result<WorkerState> {
        let shared_balance = self.shared.balance.clone();
        let mut balance = shared_balance.latch();

        let updated = self.read_body(*balance)?;
        self.touch_frames(updated)?;

        *balance = updated;
        self.report.sections += 1;
        info!("Account balance after thread {} is ${:.2}", self.name, updated);
        Ok(WorkerState::AwaitingSectionStart)
    }

    /// Applies every amount up to the section end marker
    fn read_body(&mut self, mut balance: f64) -> Result<f64> {
        loop {
            let line = match self.stream.next_line()? {
                Some(line) => line,
                None => {
                    return Err(Error::PrematureEof {
                        worker: self.name.clone(),
                        source_name: self.stream.source_name().to_string(),
                    })
                }
            };
            match self.shared.grammar.classify(&line) {
                Some(Token::EndSection) => return Ok(balance),
                Some(Token::Amount(amount)) => {
                    debug!("{} thread applying {:+.2}", self.name, amount);
                    balance += amount;
                }
                _ => return Err(self.unexpected("an amount or a section end", line)),
            }
        }
    }

    fn touch_frames(&mut self, balance: f64) -> Result<()> {
        let frames = self.shared.frames.clone();
        let mut table = frames.latch();

        let purged = self.tracker.reconcile(&table);
        if purged > 0 {
            debug!("{} thread lost {} frames since its last section", self.name, purged);
        }

        let spontaneous = self.draw_spontaneous_fault();
        if self.tracker.needs_frame(spontaneous) {
            let victim = self.policy.select(&table).ok_or_else(|| Error::NoVictim {
                worker: self.name.clone(),
            })?;
            let id = victim.frame_id();
            info!("{}", self.fault_notice(id));
            let previous = table.reassign(id, self.id);
            info!("Page being removed: {}", table.describe(&previous));
            debug!("{} thread took frame {} ({:?})", self.name, id, victim);

            self.tracker.record(id);
            self.report.faults += 1;
            if previous.owner.map_or(false, |owner| owner != self.id) {
                self.report.evictions += 1;
            }
        }

        for &id in self.tracker.owned() {
            table.get_mut(id).touch(balance);
        }
        Ok(())
    }

    fn fault_notice(&self, frame: FrameId) -> String {
        format!("Page fault in thread {}, reclaiming frame {}", self.name, frame)
    }

    fn draw_spontaneous_fault(&mut self) -> bool {
        let odds = self.shared.config.extra_fault_odds;
        odds > 0 && self.rng.gen_ratio(1, odds)
    }

    fn unexpected(&self, expected: &'static str, line: String) -> Error {
        Error::UnexpectedLine {
            worker: self.name.clone(),
            source_name: self.stream.source_name().to_string(),
            expected,
            line_no: self.stream.line_no(),
            line,
        }
    }
}
