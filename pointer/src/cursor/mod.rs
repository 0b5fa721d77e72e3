//! Cursor output: turning a pointer target into OS cursor commands.
//!
//! Provides:
//! - `mapper`: normalized pointer to screen pixels
//! - `smoother`: two-stage trajectory smoothing
//! - `controller`: step-limited movement and button dispatch
//! - `sink`: virtual pointer backends implementing `CommandSink`

pub mod controller;
pub mod mapper;
pub mod sink;
pub mod smoother;

pub use controller::{CommandSink, CursorController};
pub use mapper::{CursorMapper, MapperConfig};
pub use sink::{Command, LogSink, RecordingSink, SexpSink, VirtualPointer};
pub use smoother::CursorSmoother;
