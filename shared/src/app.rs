use tracing::{debug, info, warn};

use crate::capabilities::Capabilities;
use crate::config::FeedConfig;
use crate::event::Event;
use crate::feed::FeedClient;
use crate::model::Model;
use crate::schedule::Tick;
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl App {
    /// No-op while a fetch is running: nothing is queued and the running
    /// fetch is not cancelled.
    fn trigger_refresh(model: &mut Model, caps: &Capabilities) {
        if !model.scheduler.try_begin_fetch() {
            debug!("refresh skipped, fetch already in flight");
            return;
        }
        info!(endpoint = %model.config.endpoint, "refreshing feed");
        FeedClient::new(&model.config.endpoint)
            .fetch_all(&caps.http, |result| Event::FeedFetched(Box::new(result)));
    }

    fn set_auto_refresh(model: &mut Model, caps: &Capabilities, enabled: bool, interval_ms: Option<u64>) {
        if !enabled {
            if let Some(timer) = model.scheduler.disarm() {
                info!(timer = timer.0, "auto-refresh disabled");
                caps.timer.cancel(timer);
            }
            return;
        }

        let armed = model
            .scheduler
            .arm(interval_ms.unwrap_or(model.config.refresh_interval_ms));
        if let Some(previous) = armed.replaced {
            caps.timer.cancel(previous);
        }
        info!(
            timer = armed.cycle.timer.0,
            interval_ms = armed.cycle.interval_ms,
            "auto-refresh armed"
        );
        caps.timer.start(armed.cycle.timer, armed.cycle.interval_ms, |timer| {
            Event::RefreshTick { timer }
        });
    }

    fn apply_config(model: &mut Model, config: &FeedConfig) {
        match config.validate() {
            Ok(settings) => model.config = settings,
            Err(e) => warn!(error = %e, "ignoring invalid feed config, using defaults"),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::Start { config } => {
                if !model.mark_started() {
                    debug!("already started");
                    return;
                }
                if let Some(config) = config {
                    Self::apply_config(model, &config);
                }
                Self::trigger_refresh(model, caps);
            }

            Event::RefreshRequested => Self::trigger_refresh(model, caps),

            Event::AutoRefreshChanged {
                enabled,
                interval_ms,
            } => Self::set_auto_refresh(model, caps, enabled, interval_ms),

            Event::RefreshTick { timer } => match model.scheduler.on_tick(timer) {
                Tick::Due(cycle) => {
                    Self::trigger_refresh(model, caps);
                    caps.timer.start(cycle.timer, cycle.interval_ms, |timer| {
                        Event::RefreshTick { timer }
                    });
                }
                Tick::Stale => {
                    debug!(timer = timer.0, "ignoring tick from a retired timer");
                    return;
                }
            },

            Event::FeedFetched(result) => {
                model.scheduler.finish_fetch();
                match *result {
                    Ok(records) => {
                        info!(records = records.len(), "feed applied");
                        model.apply_records(records);
                        caps.timer.now(Event::FetchStamped);
                    }
                    Err(e) => {
                        warn!(error = %e, transient = e.is_transient(), "feed refresh failed");
                        model.apply_failure(e);
                    }
                }
            }

            Event::FetchStamped(at) => model.feed.stamp(at),

            Event::MinMagnitudeChanged { value } => {
                if !model.set_min_magnitude(value) {
                    return;
                }
            }

            Event::SearchTextChanged { text } => model.set_pending_search(text),

            Event::SearchSubmitted => {
                model.commit_search();
            }

            Event::SearchCleared => {
                model.clear_search();
            }

            Event::QuakeSelected { id } => {
                if model.feed.find(&id).is_none() {
                    debug!(%id, "selected id is not in the current feed");
                }
                if !model.selection.select(id) {
                    return;
                }
            }

            Event::SelectionCleared => {
                if !model.selection.clear() {
                    return;
                }
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
