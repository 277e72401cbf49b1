use std::time::Duration;

use tracing::debug;

use crate::paging::frame::FrameTable;
use crate::sync::{BinarySemaphore, BinarySemaphoreMethods as _, Latch as _};

/// Background worker that ages the frame table by clearing every referenced bit once per interval
pub struct ClockTicker {
    frames: FrameTable,
    stop: BinarySemaphore,
    interval: Duration,
}

impl ClockTicker {
    pub fn new(frames: FrameTable, stop: BinarySemaphore, interval: Duration) -> Self {
        ClockTicker {
            frames,
            stop,
            interval,
        }
    }

    /// Runs until `stop` is posted. Returns the number of ticks performed
    pub fn run(self) -> usize {
        let mut ticks = 0;
        loop {
            if self.stop.wait_for(self.interval) {
                break;
            }
            let mut table = self.frames.latch();
            // shutdown may have begun while we waited on the latch
            if self.stop.is_posted() {
                break;
            }
            let cleared = table.reset_referenced();
            drop(table);
            ticks += 1;
            debug!("clock tick {} cleared {} referenced bits", ticks, cleared);
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::paging::frame::FrameTableApi as _;
    use crate::sync::{BinarySemaphoreMethods as _, Latch as _};

    #[test]
    fn ticks_until_stopped() {
        let frames = FrameTable::create(&["a".to_string(), "b".to_string()]);
        let stop = BinarySemaphore::init(false);
        {
            let mut table = frames.latch();
            table.get_mut(1).touch(-1.0);
            table.get_mut(2).touch(1.0);
        }

        let ticker = ClockTicker::new(frames.clone(), stop.clone(), Duration::from_millis(5));
        let handle = thread::spawn(move || ticker.run());

        while frames.snapshot().iter().any(|f| f.referenced) {
            thread::sleep(Duration::from_millis(1));
        }
        stop.post();
        let ticks = handle.join().unwrap();
        assert!(ticks >= 1);

        let snapshot = frames.snapshot();
        assert!(snapshot.iter().all(|f| !f.referenced));
        assert!(snapshot[1].modified);
    }

    #[test]
    fn stop_posted_while_waiting_on_latch_skips_the_pass() {
        let frames = FrameTable::create(&["a".to_string()]);
        let stop = BinarySemaphore::init(false);
        let mut table = frames.latch();
        table.get_mut(1).touch(1.0);

        let ticker = ClockTicker::new(frames.clone(), stop.clone(), Duration::from_millis(5));
        let handle = thread::spawn(move || ticker.run());

        // let the interval lapse so the ticker is blocked on the latch
        thread::sleep(Duration::from_millis(50));
        stop.post();
        drop(table);

        assert_eq!(handle.join().unwrap(), 0);
        assert!(frames.snapshot()[1].referenced);
    }

    #[test]
    fn stopped_before_start_never_ticks() {
        let frames = FrameTable::create(&["a".to_string()]);
        frames.latch().get_mut(1).touch(1.0);
        let stop = BinarySemaphore::init(true);

        let ticks = ClockTicker::new(frames.clone(), stop, Duration::from_millis(1)).run();
        assert_eq!(ticks, 0);
        assert!(frames.snapshot()[1].referenced);
    }
}
