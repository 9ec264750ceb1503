//! Circular always-on-top magnifier lens.
//!
//! Everything except [`platform`] is pure: events go through
//! [`dispatch::dispatch`] and come back as [`messages::Effect`]s, which
//! [`runtime::MagnifierRuntime`] hands to a [`backend::Backend`].

pub mod backend;
pub mod dispatch;
pub mod geometry;
pub mod input;
pub mod messages;
pub mod platform;
pub mod region;
pub mod runtime;
pub mod source;
pub mod state;

pub use dispatch::dispatch;
pub use geometry::{MagnifierState, ScreenMetrics, ScreenPoint, ScreenRect};
pub use messages::{Effect, MagnifierEvent};
pub use runtime::MagnifierRuntime;
