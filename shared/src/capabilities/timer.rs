use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::model::UnixTimeMs;

/// Identifies one armed timer. The shell echoes it back when the timer
/// fires or is cancelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOperation {
    /// One-shot: resolve with `Fired` after `millis`, or `Cancelled`.
    Start { id: TimerId, millis: u64 },
    /// Fire-and-forget; the shell drops the pending timer if it has one.
    Cancel { id: TimerId },
    /// Wall-clock read.
    Now,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOutput {
    Fired { id: TimerId },
    Cancelled { id: TimerId },
    Now { epoch_ms: i64 },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

#[derive(crux_core::macros::Capability)]
pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Timer<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    /// Sends `make_event(id)` back into the app once the timer fires.
    /// A cancelled timer produces no event.
    pub fn start<F>(&self, id: TimerId, millis: u64, make_event: F)
    where
        F: FnOnce(TimerId) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            match context
                .request_from_shell(TimerOperation::Start { id, millis })
                .await
            {
                TimerOutput::Fired { id } => context.update_app(make_event(id)),
                other => tracing::debug!(?other, timer = id.0, "timer ended without firing"),
            }
        });
    }

    pub fn cancel(&self, id: TimerId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }

    pub fn now<F>(&self, make_event: F)
    where
        F: FnOnce(UnixTimeMs) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            match context.request_from_shell(TimerOperation::Now).await {
                TimerOutput::Now { epoch_ms } => context.update_app(make_event(UnixTimeMs(epoch_ms))),
                other => tracing::warn!(?other, "clock request answered with a timer output"),
            }
        });
    }
}
