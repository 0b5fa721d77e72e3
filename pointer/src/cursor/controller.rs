//! Cursor command dispatch with per-frame step limiting.

use tracing::trace;

/// OS pointer binding.  Implementations are assumed synchronous and
/// infallible at this layer.
pub trait CommandSink {
    /// Current absolute cursor position in pixels.
    fn position(&self) -> (i32, i32);
    /// Warp to an absolute position.
    fn move_to(&mut self, x: i32, y: i32);
    /// Move relative to the current position.
    fn move_by(&mut self, dx: i32, dy: i32);
    fn left_click(&mut self);
    fn button_down(&mut self);
    fn button_up(&mut self);
    /// Positive scrolls up.
    fn scroll(&mut self, amount: i32);
}

/// Rate-limited cursor movement plus pass-through button commands.
#[derive(Debug, Clone)]
pub struct CursorController {
    /// Largest per-axis jump in a single frame.
    pub max_step_px: i32,
}

impl CursorController {
    pub fn new(max_step_px: i32) -> Self {
        Self {
            max_step_px: max_step_px.max(0),
        }
    }

    /// Per-axis delta toward `target`, clamped to the step limit.
    pub fn step_toward(&self, current: (i32, i32), target: (i32, i32)) -> (i32, i32) {
        let limit = self.max_step_px;
        let dx = target.0.saturating_sub(current.0).clamp(-limit, limit);
        let dy = target.1.saturating_sub(current.1).clamp(-limit, limit);
        (dx, dy)
    }

    /// Move one limited step toward `target`.  Returns the delta issued.
    pub fn move_toward(&self, sink: &mut dyn CommandSink, target: (i32, i32)) -> (i32, i32) {
        let current = sink.position();
        let (dx, dy) = self.step_toward(current, target);
        trace!(?current, ?target, dx, dy, "cursor step");
        if dx != 0 || dy != 0 {
            sink.move_by(dx, dy);
        }
        (dx, dy)
    }

    pub fn left_click(&self, sink: &mut dyn CommandSink) {
        sink.left_click();
    }

    pub fn drag_down(&self, sink: &mut dyn CommandSink) {
        sink.button_down();
    }

    pub fn drag_up(&self, sink: &mut dyn CommandSink) {
        sink.button_up();
    }

    pub fn scroll(&self, sink: &mut dyn CommandSink, amount: i32) {
        sink.scroll(amount);
    }
}
