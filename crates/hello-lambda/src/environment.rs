//! Debug logging of the process environment.
//!
//! Output is one marker line followed by one `KEY=VALUE` line per variable.
//! Values of variables whose names look like credentials are masked unless
//! redaction is turned off.

use std::ffi::OsString;

/// First line of every environment dump.
pub const MARKER: &str = "in handler vvv";

const REDACTED: &str = "<redacted>";

const SENSITIVE_MARKERS: &[&str] = &["SECRET", "TOKEN", "PASSWORD", "KEY", "CREDENTIAL", "SESSION"];

/// Returns `true` if a variable with this name should not be logged verbatim.
pub fn is_sensitive(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SENSITIVE_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Renders the marker line and one `KEY=VALUE` line per variable, in order.
pub fn environment_lines<I, K, V>(vars: I, redact: bool) -> Vec<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    std::iter::once(MARKER.to_string())
        .chain(vars.into_iter().map(|(name, value)| {
            let name = name.as_ref();
            if redact && is_sensitive(name) {
                format!("{name}={REDACTED}")
            } else {
                format!("{name}={}", value.as_ref())
            }
        }))
        .collect()
}

/// Logs the current process environment at `info` with target `environment`.
pub fn log_environment(redact: bool) {
    let vars = std::env::vars_os().map(|(k, v)| (lossy(k), lossy(v)));

    for line in environment_lines(vars, redact) {
        tracing::info!(target: "environment", "{line}");
    }
}

fn lossy(s: OsString) -> String {
    s.to_string_lossy().into_owned()
}
