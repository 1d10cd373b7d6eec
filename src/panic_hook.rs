//! Panic hook for the interactive dashboard
//!
//! Only a panic on the UI thread puts the terminal back. Fetch pipelines run
//! on runtime workers and are turned into degraded slices by the dashboard,
//! so their panics are logged and the UI keeps drawing.

use std::io;
use std::panic;
use std::thread;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use tracing::error;

/// Leaves raw mode and the alternate screen, ignoring failures
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
///
/// Must be called from the thread that draws the UI.
pub fn install() {
    install_with(restore_terminal);
}

/// Same as [`install`] with a custom restore action
pub fn install_with<R>(restore: R)
where
    R: Fn() + Send + Sync + 'static,
{
    let ui_thread = thread::current().id();
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if thread::current().id() != ui_thread {
            error!(panic = %panic_info, "background task panicked");
            return;
        }
        restore();
        original_hook(panic_info);
    }));
}
