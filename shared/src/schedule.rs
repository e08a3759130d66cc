//! Refresh scheduling.
//!
//! [`RefreshScheduler`] is the bookkeeping half of refresh: it guards the
//! single in-flight fetch and tracks which timer currently owns the
//! auto-refresh cycle. The app turns its answers into HTTP and timer effects.
//!
//! Every arm hands out a fresh [`TimerId`]. A tick carrying any other id is
//! stale (it belongs to a disarmed or replaced cycle) and is ignored, which
//! is what keeps re-enabling from ever running two cycles at once.

use crate::capabilities::TimerId;

/// Shortest period accepted for auto-refresh.
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AutoRefresh {
    pub timer: TimerId,
    pub interval_ms: u64,
}

/// Result of arming auto-refresh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Armed {
    pub cycle: AutoRefresh,
    /// Previous cycle's timer, which the caller should cancel.
    pub replaced: Option<TimerId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Refresh now and re-arm the same cycle.
    Due(AutoRefresh),
    Stale,
}

#[derive(Clone, Debug, Default)]
pub struct RefreshScheduler {
    in_flight: bool,
    auto: Option<AutoRefresh>,
    next_timer: u64,
}

impl RefreshScheduler {
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn auto_refresh(&self) -> Option<AutoRefresh> {
        self.auto
    }

    /// Claims the fetch slot. `false` means a fetch is already running and
    /// the caller must not start another one.
    pub fn try_begin_fetch(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish_fetch(&mut self) {
        self.in_flight = false;
    }

    /// Starts a new cycle, restarting the interval from zero if one was
    /// already running.
    pub fn arm(&mut self, interval_ms: u64) -> Armed {
        self.next_timer += 1;
        let cycle = AutoRefresh {
            timer: TimerId(self.next_timer),
            interval_ms: interval_ms.max(MIN_REFRESH_INTERVAL_MS),
        };
        let replaced = self.auto.replace(cycle).map(|c| c.timer);
        Armed { cycle, replaced }
    }

    /// Ends the cycle. The in-flight fetch, if any, is left alone.
    pub fn disarm(&mut self) -> Option<TimerId> {
        self.auto.take().map(|c| c.timer)
    }

    pub fn on_tick(&self, timer: TimerId) -> Tick {
        match self.auto {
            Some(cycle) if cycle.timer == timer => Tick::Due(cycle),
            _ => Tick::Stale,
        }
    }
}
