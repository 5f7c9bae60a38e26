//! Directory of bundled nk tables, addressed by material name.
//!
//! The directory is configuration: callers pass it in explicitly, or it is
//! taken from `RCWA_NK_DATA_DIR`, falling back to `./nkData`.

use crate::material::{DataFormatError, Material};
use globset::{Glob, GlobBuilder, GlobMatcher};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const NK_DATA_DIR_ENV: &str = "RCWA_NK_DATA_DIR";
pub const DEFAULT_NK_DATA_DIR: &str = "nkData";
const MATERIAL_FILE_GLOB: &str = "*.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NkDataConfig {
    pub root: PathBuf,
}

impl NkDataConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Explicit path, then `RCWA_NK_DATA_DIR`, then `./nkData`.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        Self::resolve_from(explicit, std::env::var_os(NK_DATA_DIR_ENV))
    }

    pub(crate) fn resolve_from(explicit: Option<PathBuf>, env_value: Option<OsString>) -> Self {
        let root = explicit
            .or_else(|| {
                env_value
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NK_DATA_DIR));
        Self { root }
    }
}

impl Default for NkDataConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NK_DATA_DIR)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("material name '{name}' must be a bare file name without directories")]
    InvalidName { name: String },
    #[error("material '{name}' not found at '{}'", path.display())]
    NotFound { name: String, path: PathBuf },
    #[error("failed to scan nk data directory '{}': {message}", root.display())]
    Scan { root: PathBuf, message: String },
    #[error(transparent)]
    Load(#[from] DataFormatError),
}

#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    config: NkDataConfig,
}

impl MaterialLibrary {
    pub fn new(config: NkDataConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, LibraryError> {
        let trimmed = name.trim();
        let is_bare = !trimmed.is_empty()
            && trimmed != "."
            && trimmed != ".."
            && !trimmed.contains(['/', '\\']);
        if !is_bare {
            return Err(LibraryError::InvalidName {
                name: name.to_string(),
            });
        }

        let file_name = if material_matcher()?.is_match(trimmed) {
            trimmed.to_string()
        } else {
            format!("{trimmed}.csv")
        };
        Ok(self.config.root.join(file_name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|path| path.is_file())
    }

    pub fn open(&self, name: &str) -> Result<Material, LibraryError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(LibraryError::NotFound {
                name: name.to_string(),
                path,
            });
        }
        Ok(Material::from_csv_path(&path)?)
    }

    /// Material names (file stems) available under the root, sorted.
    pub fn list(&self) -> Result<Vec<String>, LibraryError> {
        let root = &self.config.root;
        let scan_error = |message: String| LibraryError::Scan {
            root: root.clone(),
            message,
        };
        let matcher = material_matcher()?;

        let mut names = Vec::new();
        for entry in fs::read_dir(root).map_err(|source| scan_error(source.to_string()))? {
            let entry = entry.map_err(|source| scan_error(source.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if !matcher.is_match(file_name) {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                names.push(stem.to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Loads `spec` as a file path when it is an existing file or has more
    /// than one path component (`dir/name.csv`), otherwise by library name.
    pub fn resolve_material(&self, spec: &str) -> Result<Material, LibraryError> {
        let candidate = Path::new(spec);
        if candidate.is_file() || candidate.components().count() > 1 {
            return Ok(Material::from_csv_path(candidate)?);
        }
        self.open(spec)
    }
}

fn material_matcher() -> Result<GlobMatcher, LibraryError> {
    GlobBuilder::new(MATERIAL_FILE_GLOB)
        .case_insensitive(true)
        .build()
        .map(|glob: Glob| glob.compile_matcher())
        .map_err(|source| LibraryError::Scan {
            root: PathBuf::new(),
            message: source.to_string(),
        })
}
