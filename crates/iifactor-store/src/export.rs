//! Plain-text export: every credential's key URI, one per line.

use std::path::{Path, PathBuf};

use iifactor_otp::Credential;

use crate::atomic::write_atomic;
use crate::error::StoreError;

/// Render `credentials` as newline-terminated key URIs, in list order.
///
/// Each credential contributes the URI it was stored with, so a later
/// import reproduces the original parameters exactly.
#[must_use]
pub fn export_text(credentials: &[Credential]) -> String {
    credentials.iter().fold(String::new(), |mut out, credential| {
        out.push_str(credential.uri());
        out.push('\n');
        out
    })
}

/// Default export file name for `unix_time`, e.g.
/// `IIFactor-accounts-2026-02-09.txt`.
#[must_use]
pub fn export_file_name(unix_time: u64) -> String {
    let (year, month, day) = epoch_to_date(unix_time);
    format!("IIFactor-accounts-{year:04}-{month:02}-{day:02}.txt")
}

/// Write [`export_text`] to `dir` under [`export_file_name`].
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be written.
pub fn write_export(
    dir: &Path,
    credentials: &[Credential],
    unix_time: u64,
) -> Result<PathBuf, StoreError> {
    let path = write_atomic(dir, &export_file_name(unix_time), &export_text(credentials))?;
    tracing::info!(path = %path.display(), count = credentials.len(), "credentials exported");
    Ok(path)
}

/// Convert epoch seconds to a (year, month, day) UTC civil date.
#[allow(clippy::arithmetic_side_effects)]
const fn epoch_to_date(epoch_secs: u64) -> (u64, u64, u64) {
    // Howard Hinnant's `civil_from_days`, days counted from 0000-03-01.
    let z = epoch_secs / 86_400 + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if m <= 2 { y + 1 } else { y };

    (year, m, d)
}
