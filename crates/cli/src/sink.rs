//! Destination for the identities document.

use std::io;
use std::path::Path;

use mg2sh_core::errors::OutputError;
use mg2sh_core::export::IdentityExport;
use tempfile::NamedTempFile;
use tracing::info;

/// Write `export` to `output`, or to standard output when `None`.
pub fn write_export(export: &IdentityExport, output: Option<&Path>) -> Result<(), OutputError> {
    match output {
        None => export.write_to(io::stdout().lock()),
        Some(path) => write_file(export, path),
    }
}

// The document lands in a temporary file next to the target and is renamed
// over it, so a failed write never leaves a truncated file behind.
fn write_file(export: &IdentityExport, path: &Path) -> Result<(), OutputError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    export.write_to(&mut tmp)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(path).map_err(|e| OutputError::Persist {
        path: path.display().to_string(),
        detail: e.error.to_string(),
    })?;

    info!(
        path = %path.display(),
        identities = export.identities.len(),
        "identities written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg2sh_core::identity::Identity;

    fn sample() -> IdentityExport {
        IdentityExport {
            time: "2014-06-01 12:00:00.000000".into(),
            source: "irc".into(),
            identities: vec![Identity {
                name: None,
                email: None,
                username: Some("bob".into()),
            }],
        }
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identities.json");

        write_export(&sample(), Some(&path)).unwrap();

        let written: IdentityExport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, sample());
    }

    #[test]
    fn test_write_file_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identities.json");
        std::fs::write(&path, "stale").unwrap();

        write_export(&sample(), Some(&path)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"username\": \"bob\""));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_file_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("identities.json");

        let result = write_export(&sample(), Some(&path));
        assert!(matches!(result, Err(OutputError::Io(_))));
        assert!(!path.exists());
    }
}
