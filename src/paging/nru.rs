//! Not-Recently-Used victim selection over the circular frame table.

use std::fmt::Display;

use crate::paging::frame::{Frame, FrameTableCtx};
use crate::shared::FrameId;

/// NRU priority class of an owned frame; lower classes are evicted first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NruClass {
    Clean = 0,
    Modified = 1,
    Referenced = 2,
    ReferencedModified = 3,
}

impl NruClass {
    pub const ALL: [NruClass; 4] = [
        NruClass::Clean,
        NruClass::Modified,
        NruClass::Referenced,
        NruClass::ReferencedModified,
    ];

    pub fn of(frame: &Frame) -> NruClass {
        match (frame.referenced, frame.modified) {
            (false, false) => NruClass::Clean,
            (false, true) => NruClass::Modified,
            (true, false) => NruClass::Referenced,
            (true, true) => NruClass::ReferencedModified,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for NruClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "class {}", self.index())
    }
}

/// The frame chosen to satisfy a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Victim {
    /// The free frame; nothing is evicted
    Unowned(FrameId),
    Evict { frame: FrameId, class: NruClass },
}

impl Victim {
    pub fn frame_id(&self) -> FrameId {
        match *self {
            Victim::Unowned(frame) => frame,
            Victim::Evict { frame, .. } => frame,
        }
    }

    pub fn is_eviction(&self) -> bool {
        matches!(self, Victim::Evict { .. })
    }
}

pub trait ReplacementPolicy {
    /// Picks the frame to hand to a faulting worker. Only returns None for an empty table
    fn select(&self, table: &FrameTableCtx) -> Option<Victim>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NruPolicy;

impl ReplacementPolicy for NruPolicy {
    /// One pass from the head. An unowned frame ends the scan; otherwise the last frame seen in
    /// the lowest non-empty class wins
    fn select(&self, table: &FrameTableCtx) -> Option<Victim> {
        let mut last_seen: [Option<FrameId>; 4] = [None; 4];
        for (id, frame) in table.circular() {
            if frame.is_unowned() {
                return Some(Victim::Unowned(id));
            }
            last_seen[NruClass::of(frame).index()] = Some(id);
        }
        NruClass::ALL.iter().find_map(|&class| {
            last_seen[class.index()].map(|frame| Victim::Evict { frame, class })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(owner: usize, referenced: bool, modified: bool) -> Frame {
        Frame {
            owner: Some(owner),
            referenced,
            modified,
        }
    }

    fn class_frame(owner: usize, class: NruClass) -> Frame {
        match class {
            NruClass::Clean => frame(owner, false, false),
            NruClass::Modified => frame(owner, false, true),
            NruClass::Referenced => frame(owner, true, false),
            NruClass::ReferencedModified => frame(owner, true, true),
        }
    }

    #[test]
    fn classify() {
        for class in NruClass::ALL {
            assert_eq!(NruClass::of(&class_frame(0, class)), class);
        }
        assert!(NruClass::Clean < NruClass::ReferencedModified);
    }

    #[test]
    fn picks_class_zero_among_mixed() {
        let table = FrameTableCtx::from_frames(vec![
            class_frame(0, NruClass::ReferencedModified),
            class_frame(1, NruClass::Modified),
            class_frame(2, NruClass::Clean),
            class_frame(3, NruClass::Referenced),
        ]);
        assert_eq!(
            NruPolicy.select(&table),
            Some(Victim::Evict {
                frame: 2,
                class: NruClass::Clean
            })
        );
    }

    #[test]
    fn picks_last_seen_within_class() {
        let table = FrameTableCtx::from_frames(vec![
            class_frame(0, NruClass::Modified),
            class_frame(1, NruClass::ReferencedModified),
            class_frame(2, NruClass::Modified),
        ]);
        assert_eq!(NruPolicy.select(&table).map(|v| v.frame_id()), Some(2));
    }

    #[test]
    fn unowned_frame_wins_over_clean_frames() {
        let table = FrameTableCtx::from_frames(vec![
            class_frame(0, NruClass::Clean),
            Frame::default(),
            class_frame(1, NruClass::Clean),
        ]);
        let victim = NruPolicy.select(&table).unwrap();
        assert_eq!(victim, Victim::Unowned(1));
        assert!(!victim.is_eviction());
    }

    #[test]
    fn falls_through_to_worst_class() {
        let table = FrameTableCtx::from_frames(vec![
            class_frame(0, NruClass::ReferencedModified),
            class_frame(1, NruClass::ReferencedModified),
        ]);
        let victim = NruPolicy.select(&table).unwrap();
        assert_eq!(victim.frame_id(), 1);
        assert!(victim.is_eviction());
    }

    #[test]
    fn empty_table_has_no_victim() {
        assert_eq!(NruPolicy.select(&FrameTableCtx::from_frames(vec![])), None);
    }
}
