mod timer;

pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};

// Crux's built-in Render and the crux_http capability cover view updates
// and the feed request as they are.
pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub timer: Timer<Event>,
}
