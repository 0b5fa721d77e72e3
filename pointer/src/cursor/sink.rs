//! Command sinks: virtual pointers that stand in for the OS binding.
//!
//! - `RecordingSink` keeps every command (tests, scripted runs)
//! - `LogSink` logs commands and keeps per-kind counts
//! - `SexpSink` writes one s-expression event per command

use std::io::Write;

use tracing::{debug, warn};

use super::controller::CommandSink;

/// A command issued to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveTo(i32, i32),
    MoveBy(i32, i32),
    Click,
    ButtonDown,
    ButtonUp,
    Scroll(i32),
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoveTo(..) => "move-to",
            Self::MoveBy(..) => "move",
            Self::Click => "click",
            Self::ButtonDown => "button-down",
            Self::ButtonUp => "button-up",
            Self::Scroll(_) => "scroll",
        }
    }
}

// ── Virtual pointer ────────────────────────────────────────

/// Tracked cursor position, optionally confined to a screen.
#[derive(Debug, Clone)]
pub struct VirtualPointer {
    pub x: i32,
    pub y: i32,
    /// Screen size; positions are clamped to `[0, w] x [0, h]` when set.
    pub bounds: Option<(i32, i32)>,
}

impl VirtualPointer {
    pub fn new(x: i32, y: i32, bounds: Option<(i32, i32)>) -> Self {
        let mut p = Self { x, y, bounds };
        p.confine();
        p
    }

    fn confine(&mut self) {
        if let Some((w, h)) = self.bounds {
            self.x = self.x.clamp(0, w.max(0));
            self.y = self.y.clamp(0, h.max(0));
        }
    }

    /// Update position for a movement command; buttons leave it unchanged.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::MoveTo(x, y) => {
                self.x = x;
                self.y = y;
            }
            Command::MoveBy(dx, dy) => {
                self.x = self.x.saturating_add(dx);
                self.y = self.y.saturating_add(dy);
            }
            _ => return,
        }
        self.confine();
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Route the `CommandSink` surface through one `issue` method.
macro_rules! impl_command_sink {
    ($ty:ty $(, $gen:ident : $bound:ident)?) => {
        impl$(<$gen: $bound>)? CommandSink for $ty {
            fn position(&self) -> (i32, i32) {
                self.pointer.position()
            }
            fn move_to(&mut self, x: i32, y: i32) {
                self.issue(Command::MoveTo(x, y));
            }
            fn move_by(&mut self, dx: i32, dy: i32) {
                self.issue(Command::MoveBy(dx, dy));
            }
            fn left_click(&mut self) {
                self.issue(Command::Click);
            }
            fn button_down(&mut self) {
                self.issue(Command::ButtonDown);
            }
            fn button_up(&mut self) {
                self.issue(Command::ButtonUp);
            }
            fn scroll(&mut self, amount: i32) {
                self.issue(Command::Scroll(amount));
            }
        }
    };
}

// ── Recording sink ─────────────────────────────────────────

/// Records every command in order.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    pub pointer: VirtualPointer,
    pub commands: Vec<Command>,
}

impl RecordingSink {
    /// Unbounded pointer starting at `(x, y)`.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            pointer: VirtualPointer::new(x, y, None),
            commands: Vec::new(),
        }
    }

    fn issue(&mut self, command: Command) {
        self.pointer.apply(command);
        self.commands.push(command);
    }

    /// Commands other than movement.
    pub fn buttons(&self) -> Vec<Command> {
        self.commands
            .iter()
            .copied()
            .filter(|c| !matches!(c, Command::MoveTo(..) | Command::MoveBy(..)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl_command_sink!(RecordingSink);

// ── Log sink ───────────────────────────────────────────────

/// Per-kind command totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandCounts {
    pub moves: u64,
    pub clicks: u64,
    pub button_downs: u64,
    pub button_ups: u64,
    pub scrolls: u64,
}

impl CommandCounts {
    fn record(&mut self, command: Command) {
        match command {
            Command::MoveTo(..) | Command::MoveBy(..) => self.moves += 1,
            Command::Click => self.clicks += 1,
            Command::ButtonDown => self.button_downs += 1,
            Command::ButtonUp => self.button_ups += 1,
            Command::Scroll(_) => self.scrolls += 1,
        }
    }

    pub fn sexp(&self) -> String {
        format!(
            "(:moves {} :clicks {} :button-downs {} :button-ups {} :scrolls {})",
            self.moves, self.clicks, self.button_downs, self.button_ups, self.scrolls,
        )
    }
}

/// Logs each command at debug level.
#[derive(Debug, Clone)]
pub struct LogSink {
    pub pointer: VirtualPointer,
    pub counts: CommandCounts,
}

impl LogSink {
    pub fn new(pointer: VirtualPointer) -> Self {
        Self {
            pointer,
            counts: CommandCounts::default(),
        }
    }

    fn issue(&mut self, command: Command) {
        self.pointer.apply(command);
        self.counts.record(command);
        debug!(
            command = command.as_str(),
            x = self.pointer.x,
            y = self.pointer.y,
            "pointer command"
        );
    }
}

impl_command_sink!(LogSink);

// ── S-expression sink ──────────────────────────────────────

/// Format one event line.
pub fn format_event(command: Command, position: (i32, i32)) -> String {
    let mut s = format!("(:type :event :event :{}", command.as_str());
    match command {
        Command::MoveTo(x, y) => s.push_str(&format!(" :x {} :y {}", x, y)),
        Command::MoveBy(dx, dy) => s.push_str(&format!(
            " :dx {} :dy {} :x {} :y {}",
            dx, dy, position.0, position.1
        )),
        Command::Scroll(amount) => s.push_str(&format!(" :amount {}", amount)),
        Command::Click | Command::ButtonDown | Command::ButtonUp => {}
    }
    s.push(')');
    s
}

/// Writes commands as newline-delimited s-expressions.
pub struct SexpSink<W: Write> {
    pub pointer: VirtualPointer,
    out: W,
    write_failed: bool,
}

impl<W: Write> SexpSink<W> {
    pub fn new(pointer: VirtualPointer, out: W) -> Self {
        Self {
            pointer,
            out,
            write_failed: false,
        }
    }

    fn issue(&mut self, command: Command) {
        self.pointer.apply(command);
        if self.write_failed {
            return;
        }
        let line = format_event(command, self.pointer.position());
        if let Err(e) = writeln!(self.out, "{}", line) {
            // Keep the frame loop running; the output is gone for good.
            warn!("event output failed, dropping further events: {}", e);
            self.write_failed = true;
        }
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl_command_sink!(SexpSink<W>, W: Write);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_pointer_bounds() {
        let mut p = VirtualPointer::new(10, 10, Some((100, 50)));
        p.apply(Command::MoveBy(-50, 100));
        assert_eq!(p.position(), (0, 50));
        p.apply(Command::MoveTo(500, 20));
        assert_eq!(p.position(), (100, 20));
        p.apply(Command::Click);
        assert_eq!(p.position(), (100, 20));
    }

    #[test]
    fn test_virtual_pointer_unbounded_saturates() {
        let mut p = VirtualPointer::new(i32::MAX - 1, 0, None);
        p.apply(Command::MoveBy(10, 0));
        assert_eq!(p.x, i32::MAX);
    }

    #[test]
    fn test_recording_sink_buttons() {
        let mut sink = RecordingSink::at(0, 0);
        sink.move_by(3, 4);
        sink.left_click();
        sink.scroll(5);
        assert_eq!(sink.position(), (3, 4));
        assert_eq!(sink.buttons(), vec![Command::Click, Command::Scroll(5)]);
    }

    #[test]
    fn test_log_sink_counts() {
        let mut sink = LogSink::new(VirtualPointer::new(0, 0, Some((1920, 1080))));
        sink.move_by(10, 10);
        sink.move_to(5, 5);
        sink.button_down();
        sink.button_up();
        sink.scroll(-2);
        assert_eq!(
            sink.counts,
            CommandCounts {
                moves: 2,
                clicks: 0,
                button_downs: 1,
                button_ups: 1,
                scrolls: 1,
            }
        );
        assert!(sink.counts.sexp().contains(":moves 2"));
    }

    #[test]
    fn test_format_event() {
        assert_eq!(
            format_event(Command::MoveBy(5, -3), (105, 97)),
            "(:type :event :event :move :dx 5 :dy -3 :x 105 :y 97)"
        );
        assert_eq!(format_event(Command::Click, (0, 0)), "(:type :event :event :click)");
        assert_eq!(
            format_event(Command::Scroll(-40), (0, 0)),
            "(:type :event :event :scroll :amount -40)"
        );
    }

    #[test]
    fn test_sexp_sink_lines_parse() {
        let mut sink = SexpSink::new(VirtualPointer::new(0, 0, None), Vec::new());
        sink.move_by(1, 2);
        sink.button_down();
        sink.button_up();
        sink.scroll(3);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        for line in &lines {
            let value = lexpr::from_str(line).unwrap();
            assert!(value.is_cons(), "not a list: {line}");
        }
        assert!(lines[0].contains(":x 1 :y 2"));
        assert!(lines[1].contains(":button-down"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sexp_sink_survives_write_failure() {
        let mut sink = SexpSink::new(VirtualPointer::new(0, 0, None), FailingWriter);
        sink.move_by(4, 4);
        sink.left_click();
        // Position is still tracked after the output is lost
        assert_eq!(sink.position(), (4, 4));
    }
}
