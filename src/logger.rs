//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output that only appears with `--verbose`
//! - `ProgressLine` for the single-line export counter
//!
//! # Example
//!
//! ```ignore
//! log!("export"; "writing {} files", count);
//!
//! let progress = ProgressLine::new("export", 41);
//! progress.inc();
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream, Style};
use parking_lot::Mutex;
use std::{
    fmt,
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress line count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
///
/// When a progress line is active, the message is printed above it and the
/// progress line is redrawn by its next update.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();

    if BAR_COUNT.load(Ordering::SeqCst) > 0 {
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Style `text` for `stream`, or leave it plain when colour is off there.
pub fn paint<T: fmt::Display>(stream: Stream, text: &T, style: Style) -> impl fmt::Display + '_ {
    text.if_supports_color(stream, move |t| t.style(style))
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let style = match module_lower {
        "export" => Style::new().bright_blue().bold(),
        "done" => Style::new().bright_green().bold(),
        "error" => Style::new().bright_red().bold(),
        "skip" | "warning" => Style::new().yellow().bold(),
        _ => Style::new().bright_yellow().bold(),
    };
    paint(Stream::Stdout, &format!("[{module}]"), style).to_string()
}

// ============================================================================
// Progress Line (single-line counter)
// ============================================================================

/// Single-line progress display
///
/// Displays: `[export] files(12/41)`
///
/// The counter updates in place on the same line. Regular `log!` output
/// printed while the line is active clears it first; the next `inc` redraws.
pub struct ProgressLine {
    module: &'static str,
    total: usize,
    current: AtomicUsize,
    lock: Mutex<()>,
}

impl ProgressLine {
    /// Create a new progress display for `total` units of work.
    pub fn new(module: &'static str, total: usize) -> Self {
        BAR_COUNT.store(1, Ordering::SeqCst);

        let progress = Self {
            module,
            total,
            current: AtomicUsize::new(0),
            lock: Mutex::new(()),
        };
        progress.display();
        progress
    }

    /// Set the counter to an absolute value and refresh.
    pub fn set(&self, current: usize) {
        self.current.store(current, Ordering::Relaxed);
        if self.lock.try_lock().is_some() {
            self.display();
        }
    }

    /// Increment the counter by one and refresh.
    #[inline]
    pub fn inc(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
        if self.lock.try_lock().is_some() {
            self.display();
        }
    }

    fn line(&self) -> String {
        let current = self.current.load(Ordering::Relaxed);
        let prefix = colorize_prefix(self.module, &self.module.to_ascii_lowercase());
        format!("{} files({}/{})", prefix, current, self.total)
    }

    /// Display the current progress line (overwrites current line).
    fn display(&self) {
        let line = self.line();
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        write!(stdout, "{line}").ok();
        stdout.flush().ok();
    }

    /// Finish progress display, preserve line and move to next line.
    pub fn finish(self) {
        BAR_COUNT.store(0, Ordering::SeqCst);

        {
            let _guard = self.lock.lock();
            let line = self.line();

            let mut stdout = stdout().lock();
            execute!(
                stdout,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            )
            .ok();
            writeln!(stdout, "{line}").ok();
            stdout.flush().ok();
        }

        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_COUNT.store(0, Ordering::SeqCst);

        // Clear the line on drop (if not finished properly)
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================
