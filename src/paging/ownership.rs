use crate::paging::frame::FrameTableCtx;
use crate::shared::{FrameId, WorkerId};

/// The frames one worker believes it owns. Only the owning worker touches it; it goes stale
/// whenever another worker evicts one of these frames, so reconcile before deciding on a fault
#[derive(Debug, Clone)]
pub struct OwnershipTracker {
    worker: WorkerId,
    owned: Vec<FrameId>,
}

impl OwnershipTracker {
    pub fn new(worker: WorkerId, initial: FrameId) -> Self {
        OwnershipTracker {
            worker,
            owned: vec![initial],
        }
    }

    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    pub fn owned(&self) -> &[FrameId] {
        &self.owned
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    /// Drops every frame whose owner in `table` is no longer this worker. Caller holds the table latch
    pub fn reconcile(&mut self, table: &FrameTableCtx) -> usize {
        let before = self.owned.len();
        let worker = self.worker;
        self.owned.retain(|&id| table.get(id).owner == Some(worker));
        before - self.owned.len()
    }

    /// A fault happens when nothing is left after reconciling, or when a spontaneous extra demand was drawn
    pub fn needs_frame(&self, spontaneous: bool) -> bool {
        self.owned.is_empty() || spontaneous
    }

    /// Tracks a newly granted frame. Re-granting a frame already held is a no-op
    pub fn record(&mut self, id: FrameId) {
        if !self.owned.contains(&id) {
            self.owned.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FrameTableCtx {
        FrameTableCtx::seed(&["a".to_string(), "b".to_string()])
    }

    #[test]
    fn reconcile_purges_evicted_frames() {
        let mut table = table();
        let mut tracker = OwnershipTracker::new(0, 1);
        tracker.record(0);
        table.reassign(0, 0);

        assert_eq!(tracker.reconcile(&table), 0);
        assert_eq!(tracker.owned(), &[1, 0]);

        table.reassign(1, 1);
        assert_eq!(tracker.reconcile(&table), 1);
        assert_eq!(tracker.owned(), &[0]);
        assert!(!tracker.needs_frame(false));
        assert!(tracker.needs_frame(true));
    }

    #[test]
    fn empty_after_purge_needs_frame() {
        let mut table = table();
        let mut tracker = OwnershipTracker::new(1, 2);
        table.reassign(2, 0);
        assert_eq!(tracker.reconcile(&table), 1);
        assert!(tracker.is_empty());
        assert!(tracker.needs_frame(false));
        assert_eq!(tracker.worker(), 1);
    }

    #[test]
    fn record_ignores_duplicates() {
        let mut tracker = OwnershipTracker::new(0, 1);
        tracker.record(1);
        tracker.record(3);
        assert_eq!(tracker.owned(), &[1, 3]);
    }
}
