//! Error types for per-directory rule generation.

use std::path::PathBuf;

use thiserror::Error;

/// Cause attached to a parse failure.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error produced while generating rules for a single project directory.
///
/// Every variant is fatal for its directory only. The driver reports the
/// failure with its path and moves on to sibling directories; nothing here
/// aborts a whole run. An absent manifest is not an error at all - the
/// generation op returns `Ok(None)` for that case.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The manifest exists but is unreadable or not well-formed XML.
    #[error("cannot parse project manifest {}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: Cause,
    },

    /// A lock file is present but unreadable or not valid JSON.
    #[error("cannot parse lock file {}", path.display())]
    LockParse {
        path: PathBuf,
        #[source]
        source: Cause,
    },

    /// The resolved properties do not map onto any known project kind.
    #[error("could not determine project type for {}", path.display())]
    Classification { path: PathBuf },

    /// More than one `.csproj` in a single directory. Distinct from the
    /// absent-manifest case so callers don't warn on ordinary directories.
    #[error("multiple project manifests found in {}", dir.display())]
    MultipleManifests { dir: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_paths() {
        let err = GenerateError::MultipleManifests {
            dir: PathBuf::from("apps/web"),
        };
        assert!(err.to_string().contains("apps/web"));

        let err = GenerateError::Classification {
            path: PathBuf::from("apps/web/Web.csproj"),
        };
        assert!(err.to_string().contains("Web.csproj"));
    }
}
