// src/printer/printers.rs

//! Colored status printing to the terminal.
//!
//! Only the _ncc_ main thread prints; file processing threads send their
//! one-line status messages through the log channel instead.

use crate::debug::printers::de_err;

use std::io::Write; // for `flush`

#[doc(hidden)]
pub use ::termcolor::{
    Color,
    ColorChoice,
    ColorSpec,
    WriteColor,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// color for per-file completion messages
pub const COLOR_COMPLETE: Color = Color::Green;

/// color for per-file error messages
pub const COLOR_ERROR: Color = Color::Red;

/// Print colored output to terminal if possible using passed stream,
/// otherwise, print plain output.
///
/// See an example <https://docs.rs/termcolor/1.1.2/termcolor/#detecting-presence-of-a-terminal>.
pub fn print_colored(
    color: Color,
    value: &[u8],
    out: &mut termcolor::StandardStream,
) -> std::io::Result<()> {
    match out.set_color(ColorSpec::new().set_fg(Some(color))) {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: out.set_color({:?}) returned error {}", color, err);
            return Err(err);
        }
    };
    match out.write(value) {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: out.write(…) returned error {}", err);
            return Err(err);
        }
    }
    match out.reset() {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: out.reset() returned error {}", err);
            return Err(err);
        }
    }
    out.flush()?;

    Ok(())
}

/// Print colored output to terminal on stdout.
pub fn print_colored_stdout(
    color: Color,
    color_choice: ColorChoice,
    value: &[u8],
) -> std::io::Result<()> {
    let mut stdout = termcolor::StandardStream::stdout(color_choice);
    let _stdout_lock = std::io::stdout().lock();
    let _stderr_lock = std::io::stderr().lock();

    print_colored(color, value, &mut stdout)
}

/// Print colored output to terminal on stderr.
pub fn print_colored_stderr(
    color: Color,
    color_choice: ColorChoice,
    value: &[u8],
) -> std::io::Result<()> {
    let mut stderr = termcolor::StandardStream::stderr(color_choice);
    let _stdout_lock = std::io::stdout().lock();
    let _stderr_lock = std::io::stderr().lock();

    print_colored(color, value, &mut stderr)
}
