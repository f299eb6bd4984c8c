//! Side effects the core asks the shell to perform.
//!
//! We use Crux's built-in Render and Http capabilities directly; the weather
//! gateway is a request builder over `Http`, not a capability of its own.

pub mod location;
pub mod map_camera;
pub mod weather;

pub use self::location::{Location, LocationOperation, LocationOutput, LocationResult};
pub use self::map_camera::{MapCamera, MapCameraOperation};
pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub location: Location<Event>,
    pub map_camera: MapCamera<Event>,
}
