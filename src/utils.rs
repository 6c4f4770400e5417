use chrono::{DateTime, Local};
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

/// Get the current local time as an ISO-8601 timestamp with microseconds
///
/// The value has no UTC offset, e.g. `2024-05-01T09:30:12.123456`.
///
/// # Examples
///
/// ```
/// use chimera_panel::utils::iso_timestamp;
///
/// let timestamp = iso_timestamp();
/// assert!(timestamp.contains('T'));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso(&Local::now())
}

/// Get the current local time formatted for banners, e.g. `2024-05-01 09:30:12`
#[must_use]
pub fn display_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_iso(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Ask the desktop environment to open `url` in the default browser.
///
/// The launcher runs in the background; this only reports whether it could
/// be spawned.
///
/// # Errors
///
/// Returns an error if the platform launcher cannot be started.
pub fn open_browser(url: &str) -> io::Result<()> {
    spawn_reaped(launcher(url)).map(|_| ())
}

/// Spawn `command` with null stdio and wait for it on a background thread so
/// the child is reaped when it exits.
fn spawn_reaped(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(thread::spawn(move || {
        let status = child.wait();
        if let Err(e) = &status {
            tracing::debug!("Browser launcher was not reaped: {e}");
        }
        status
    }))
}

#[cfg(target_os = "macos")]
fn launcher(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn launcher(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
