//! Stepping engine.
//!
//! ```text
//!   inputs ──▶ Session::step(t) ──▶ ValueStore ──▶ SimulationInstance::advance_to(t)
//!                                                          │
//!   [("time", t), outputs...] ◀── read back in table order ◀┘
//! ```
//!
//! A [`Session`] is built from a model and its description. It resolves
//! exported names once, then exchanges values with the instance through a
//! [`ValueStore`] keyed by qualified name.

mod instance;
mod session;
mod store;
mod value;

pub use instance::{ScriptedInstance, SimulationInstance};
pub use session::Session;
pub use store::{Access, ValueStore};
pub use value::{NamedValue, TIME, Value};
