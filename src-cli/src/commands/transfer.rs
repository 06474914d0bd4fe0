//! Bulk import from, and export to, plain key URI text files.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use iifactor_otp::unix_time_now;
use iifactor_store::{
    check_duplicates, export_text, import_credentials, parse_key_uri_text, write_export,
    CredentialStore,
};

use crate::error::CliError;
use crate::state::AppState;

/// `import`: parse `file`, skip existing issuer/account pairs unless
/// `keep_duplicates`, and save the rest.
pub fn import(
    state: &mut AppState,
    file: &Path,
    group: Option<&str>,
    keep_duplicates: bool,
) -> Result<String, CliError> {
    let text = fs::read_to_string(file)?;
    let group = state.settings.group_for_new(group).map(str::to_owned);
    let parsed = parse_key_uri_text(&text, group.as_deref());

    let mut skip: Vec<usize> = if keep_duplicates {
        Vec::new()
    } else {
        check_duplicates(&state.store, &parsed.entries)?
            .into_iter()
            .map(|d| d.index)
            .collect()
    };
    skip.dedup();

    let summary = import_credentials(&mut state.store, &parsed.entries, &skip)?;

    let mut out = format!(
        "Imported {}, skipped {} duplicate(s), {} malformed line(s).\n",
        summary.imported,
        summary.skipped,
        parsed.malformed.len()
    );
    for malformed in &parsed.malformed {
        let _ = writeln!(out, "  line {}: {}", malformed.line, malformed.reason);
    }
    Ok(out)
}

/// `export`: every stored URI, to stdout or a dated file in `dir`.
pub fn export(state: &AppState, dir: Option<&Path>, stdout: bool) -> Result<String, CliError> {
    let credentials = state.store.load_all()?;
    if stdout {
        return Ok(export_text(&credentials));
    }
    let path = write_export(dir.unwrap_or_else(|| Path::new(".")), &credentials, unix_time_now())?;
    Ok(format!(
        "Exported {} credential(s) to {}\n",
        credentials.len(),
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FILE: &str = "\
otpauth://totp/GitHub:alice?secret=JBSWY3DPEHPK3PXP
otpauth://totp/GitHub:ALICE?secret=JBSWY3DPEHPK3PXP
otpauth://nope/x?secret=JBSWY3DPEHPK3PXP
";

    fn state(dir: &TempDir) -> AppState {
        AppState::open(dir.path().join("data")).unwrap()
    }

    #[test]
    fn import_reports_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let mut state = state(&dir);
        let input = dir.path().join("in.txt");
        fs::write(&input, FILE).unwrap();

        let out = import(&mut state, &input, Some("Work"), false).unwrap();
        insta::assert_snapshot!(out, @r#"
        Imported 2, skipped 0 duplicate(s), 1 malformed line(s).
          line 3: unsupported OTP type: "nope"
        "#);

        // Second run: both entries now exist.
        let again = import(&mut state, &input, None, false).unwrap();
        assert!(again.starts_with("Imported 0, skipped 2"));

        let forced = import(&mut state, &input, None, true).unwrap();
        assert!(forced.starts_with("Imported 2, skipped 0"));
        assert_eq!(state.store.load_all().unwrap().len(), 4);
    }

    #[test]
    fn export_roundtrips_through_import() {
        let dir = TempDir::new().unwrap();
        let mut source = state(&dir);
        let input = dir.path().join("in.txt");
        fs::write(&input, FILE).unwrap();
        import(&mut source, &input, None, true).unwrap();

        let text = export(&source, None, true).unwrap();
        assert_eq!(text.lines().count(), 2);

        let out = export(&source, Some(dir.path()), false).unwrap();
        assert!(out.starts_with("Exported 2 credential(s) to "));
        let written = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .find(|e| e.file_name().to_string_lossy().starts_with("IIFactor-accounts-"))
            .unwrap();
        assert_eq!(fs::read_to_string(written.path()).unwrap(), text);
    }
}
