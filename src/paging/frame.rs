use std::fmt::Display;

use crate::shared::{FrameId, WorkerId, HEAD_FRAME_ID};
use crate::sync::{Latch as _, Synchronized};

/// One slot of emulated physical memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    // None denotes the unowned frame
    pub owner: Option<WorkerId>,
    pub referenced: bool,
    pub modified: bool,
}

impl Frame {
    pub fn owned_by(owner: WorkerId) -> Frame {
        Frame {
            owner: Some(owner),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_unowned(&self) -> bool {
        self.owner.is_none()
    }

    /// Marks the frame as touched by its owner. A zero balance leaves the bits alone
    pub fn touch(&mut self, balance: f64) {
        if balance < 0.0 {
            self.referenced = true;
            self.modified = true;
        } else if balance > 0.0 {
            self.referenced = true;
        }
    }
}

/// The frame table proper. It does no locking of its own; share it as a `FrameTable`
pub struct FrameTableCtx {
    frames: Vec<Frame>,
    owners: Vec<String>,
}

pub type FrameTable = Synchronized<FrameTableCtx>;

impl FrameTableCtx {
    /// One unowned frame at the head, then one frame per worker in roster order
    pub fn seed(owners: &[String]) -> FrameTableCtx {
        let mut frames = Vec::with_capacity(owners.len() + 1);
        frames.push(Frame::default());
        frames.extend((0..owners.len()).map(Frame::owned_by));
        FrameTableCtx {
            frames,
            owners: owners.to_vec(),
        }
    }

    /// Builds a table from explicit frames; owner names default to `worker-N`
    pub fn from_frames(frames: Vec<Frame>) -> FrameTableCtx {
        let workers = frames
            .iter()
            .filter_map(|f| f.owner)
            .max()
            .map_or(0, |max| max + 1);
        FrameTableCtx {
            frames,
            owners: (0..workers).map(|i| format!("worker-{}", i)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn head(&self) -> FrameId {
        HEAD_FRAME_ID
    }

    /// The frame after `id`, wrapping back to the head. An empty table stays at the head
    #[inline]
    pub fn next(&self, id: FrameId) -> FrameId {
        if self.frames.is_empty() {
            return self.head();
        }
        (id + 1) % self.frames.len()
    }

    /// Visits every frame exactly once, starting at the head
    pub fn circular(&self) -> Circular<'_> {
        Circular {
            table: self,
            cursor: if self.is_empty() { None } else { Some(self.head()) },
        }
    }

    pub fn get(&self, id: FrameId) -> &Frame {
        &self.frames[id]
    }

    pub fn get_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id]
    }

    pub fn has_unowned(&self) -> bool {
        self.frames.iter().any(Frame::is_unowned)
    }

    pub fn unowned_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_unowned()).count()
    }

    pub fn owned_by(&self, worker: WorkerId) -> Vec<FrameId> {
        self.circular()
            .filter(|(_, f)| f.owner == Some(worker))
            .map(|(id, _)| id)
            .collect()
    }

    /// Hands `id` to `owner` with both status bits cleared. Returns the frame as it was
    pub fn reassign(&mut self, id: FrameId, owner: WorkerId) -> Frame {
        let frame = &mut self.frames[id];
        let previous = *frame;
        *frame = Frame::owned_by(owner);
        previous
    }

    /// Clears the referenced bit on every frame. Returns how many bits were actually set
    pub fn reset_referenced(&mut self) -> usize {
        let mut cleared = 0;
        let mut id = self.head();
        for _ in 0..self.frames.len() {
            let frame = &mut self.frames[id];
            if frame.referenced {
                frame.referenced = false;
                cleared += 1;
            }
            id = self.next(id);
        }
        cleared
    }

    pub fn owner_name(&self, owner: Option<WorkerId>) -> &str {
        match owner {
            Some(worker) => self.owners.get(worker).map_or("[UNKNOWN]", String::as_str),
            None => "[UNOWNED]",
        }
    }

    /// Renders a frame state as `{owner=.., referenced=.., modified=..}`
    pub fn describe<'a>(&'a self, frame: &'a Frame) -> FrameDescription<'a> {
        FrameDescription {
            owner: self.owner_name(frame.owner),
            frame,
        }
    }

    /// A copy of every frame in circular order
    pub fn snapshot(&self) -> Vec<Frame> {
        self.circular().map(|(_, f)| *f).collect()
    }
}

pub struct Circular<'a> {
    table: &'a FrameTableCtx,
    cursor: Option<FrameId>,
}

impl<'a> Iterator for Circular<'a> {
    type Item = (FrameId, &'a Frame);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let next = self.table.next(id);
        self.cursor = if next == self.table.head() { None } else { Some(next) };
        Some((id, self.table.get(id)))
    }
}

pub struct FrameDescription<'a> {
    owner: &'a str,
    frame: &'a Frame,
}

impl Display for FrameDescription<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yes_no = |bit: bool| if bit { "yes" } else { "no" };
        write!(
            f,
            "{{owner={}, referenced={}, modified={}}}",
            self.owner,
            yes_no(self.frame.referenced),
            yes_no(self.frame.modified)
        )
    }
}

pub trait FrameTableApi {
    fn create(owners: &[String]) -> Self;
    fn frame_count(&self) -> usize;
    fn snapshot(&self) -> Vec<Frame>;
    fn tick(&self) -> usize;
}

impl FrameTableApi for FrameTable {
    /// The table is fully seeded before any handle to it exists
    fn create(owners: &[String]) -> Self {
        Synchronized::init(FrameTableCtx::seed(owners))
    }

    fn frame_count(&self) -> usize {
        self.latch().len()
    }

    fn snapshot(&self) -> Vec<Frame> {
        self.latch().snapshot()
    }

    fn tick(&self) -> usize {
        self.latch().reset_referenced()
    }
}
