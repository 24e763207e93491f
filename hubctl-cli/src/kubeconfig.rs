//! Kubeconfig file output

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Writing the kubeconfig failed; the command cannot continue
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Kubeconfig `{}` exists, use --force / -f to overwrite", .0.display())]
    Exists(PathBuf),

    #[error("Unable to create `{}`: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error("Unable to write `{}`: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Unable to write kubeconfig to stdout: {0}")]
    Stdout(#[source] io::Error),
}

/// Where the kubeconfig goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Stdout,
    File(PathBuf),
}

/// Default file name for an instance's kubeconfig
pub fn default_filename(domain: &str) -> String {
    format!("kubeconfig-{}.yaml", domain)
}

/// Decide where the kubeconfig is written
///
/// `-` selects stdout. An existing directory receives a file named
/// `kubeconfig`, replacing any earlier one. A named file that already exists
/// is only overwritten with `force`.
pub fn resolve_target(
    filename: Option<&str>,
    domain: &str,
    force: bool,
) -> Result<Target, OutputError> {
    let filename = match filename {
        Some("-") => return Ok(Target::Stdout),
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_filename(domain),
    };

    let mut path = PathBuf::from(filename);
    if path.is_dir() {
        path.push("kubeconfig");
        return Ok(Target::File(path));
    }
    if path.exists() && !force {
        return Err(OutputError::Exists(path));
    }
    Ok(Target::File(path))
}

/// Write kubeconfig bytes to the target
pub fn write_kubeconfig(target: &Target, data: &[u8]) -> Result<(), OutputError> {
    match target {
        Target::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(data)
                .and_then(|_| stdout.flush())
                .map_err(OutputError::Stdout)
        }
        Target::File(path) => write_file(path, data),
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), OutputError> {
    let mut file = fs::File::create(path).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(data).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dash_is_stdout() {
        assert_eq!(resolve_target(Some("-"), "app", false).unwrap(), Target::Stdout);
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(
            resolve_target(None, "app.example.com", false).unwrap(),
            Target::File(PathBuf::from("kubeconfig-app.example.com.yaml"))
        );
    }

    #[test]
    fn test_directory_gets_kubeconfig_file() {
        let dir = TempDir::new().unwrap();
        let target = resolve_target(dir.path().to_str(), "app", false).unwrap();

        assert_eq!(target, Target::File(dir.path().join("kubeconfig")));
    }

    #[test]
    fn test_directory_target_is_rewritten() {
        let dir = TempDir::new().unwrap();

        let first = resolve_target(dir.path().to_str(), "app", false).unwrap();
        write_kubeconfig(&first, b"first").unwrap();
        let second = resolve_target(dir.path().to_str(), "app", false).unwrap();
        write_kubeconfig(&second, b"second").unwrap();

        let written = fs::read_to_string(dir.path().join("kubeconfig")).unwrap();
        assert_eq!(written, "second");
    }

    #[test]
    fn test_stdout_target_writes() {
        let target = resolve_target(Some("-"), "app", false).unwrap();

        assert!(write_kubeconfig(&target, b"apiVersion: v1\n").is_ok());
    }

    #[test]
    fn test_existing_file_requires_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "old").unwrap();

        let err = resolve_target(path.to_str(), "app", false).unwrap_err();
        assert!(matches!(err, OutputError::Exists(_)));

        let target = resolve_target(path.to_str(), "app", true).unwrap();
        write_kubeconfig(&target, b"apiVersion: v1\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "apiVersion: v1\n");
    }

    #[test]
    fn test_unwritable_location_is_fatal() {
        let dir = TempDir::new().unwrap();
        let target = Target::File(dir.path().join("missing").join("kubeconfig"));

        let err = write_kubeconfig(&target, b"x").unwrap_err();

        assert!(matches!(err, OutputError::Create { .. }));
    }
}
