use crate::cli::toml_config::TomlConfig;
use crate::rules::factory::{self, DocumentError, FactoryError, Registry};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum FillError {
    ConfigRead(std::io::Error),
    ConfigParse(toml::de::Error),
    Registry(FactoryError),
    UnknownType(String),
    GlobParse(globset::Error),
    InputRead(PathBuf, std::io::Error),
    Walk(PathBuf, ignore::Error),
    InputParse(PathBuf, serde_json::Error),
    Document(PathBuf, DocumentError),
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::ConfigRead(e) => write!(f, "failed to read config: {}", e),
            FillError::ConfigParse(e) => write!(f, "failed to parse config: {}", e),
            FillError::Registry(e) => write!(f, "invalid schema: {}", e),
            FillError::UnknownType(t) => write!(f, "type '{}' is not declared in the schema", t),
            FillError::GlobParse(e) => write!(f, "invalid glob pattern: {}", e),
            FillError::InputRead(p, e) => write!(f, "{}: failed to read: {}", p.display(), e),
            FillError::Walk(p, e) => write!(f, "{}: failed to walk: {}", p.display(), e),
            FillError::InputParse(p, e) => write!(f, "{}: invalid JSON: {}", p.display(), e),
            FillError::Document(p, e) => write!(f, "{}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for FillError {}

/// A filled JSON document and where it came from.
#[derive(Debug)]
pub struct FilledDocument {
    pub source: PathBuf,
    pub value: Value,
}

#[derive(Debug)]
pub struct FillResult {
    pub registry: Registry,
    pub documents: Vec<FilledDocument>,
}

/// Read a TOML schema and build its registry.
pub fn load_registry(config_path: &Path) -> Result<Registry, FillError> {
    let config_text = fs::read_to_string(config_path).map_err(FillError::ConfigRead)?;
    let toml_config: TomlConfig = toml::from_str(&config_text).map_err(FillError::ConfigParse)?;

    factory::build_registry(&toml_config.type_decls(), toml_config.mapper_config())
        .map_err(FillError::Registry)
}

/// Fill every JSON file under `target_paths` as an instance of `type_name`.
///
/// Explicit file paths are always read; directories are walked and filtered by `glob`.
pub fn run_fill(
    config_path: &Path,
    type_name: &str,
    target_paths: &[PathBuf],
    glob: &str,
) -> Result<FillResult, FillError> {
    let registry = load_registry(config_path)?;
    if registry.get(type_name).is_none() {
        return Err(FillError::UnknownType(type_name.to_string()));
    }

    let matcher = Glob::new(glob)
        .map_err(FillError::GlobParse)?
        .compile_matcher();
    let files = collect_files(target_paths, &matcher)?;

    let documents = files
        .par_iter()
        .map(|path| {
            let text = fs::read_to_string(path).map_err(|e| FillError::InputRead(path.clone(), e))?;
            fill_text(&registry, type_name, path, &text)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(documents = documents.len(), "filled documents");
    Ok(FillResult {
        registry,
        documents,
    })
}

/// Fill a single document given as text, e.g. read from stdin.
pub fn run_fill_text(config_path: &Path, type_name: &str, text: &str) -> Result<FillResult, FillError> {
    let registry = load_registry(config_path)?;
    if registry.get(type_name).is_none() {
        return Err(FillError::UnknownType(type_name.to_string()));
    }

    let document = fill_text(&registry, type_name, Path::new("<stdin>"), text)?;
    Ok(FillResult {
        registry,
        documents: vec![document],
    })
}

fn fill_text(
    registry: &Registry,
    type_name: &str,
    source: &Path,
    text: &str,
) -> Result<FilledDocument, FillError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| FillError::InputParse(source.to_path_buf(), e))?;
    let value = registry
        .fill(type_name, value)
        .map_err(|e| FillError::Document(source.to_path_buf(), e))?;

    Ok(FilledDocument {
        source: source.to_path_buf(),
        value,
    })
}

/// Explicit files are kept as given; directories are walked, hidden files included.
/// A path reached twice is only filled once.
fn collect_files(target_paths: &[PathBuf], matcher: &GlobMatcher) -> Result<Vec<PathBuf>, FillError> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |path: PathBuf, files: &mut Vec<PathBuf>| {
        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            files.push(path);
        }
    };

    for target in target_paths {
        if target.is_file() {
            push(target.clone(), &mut files);
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkBuilder::new(target).hidden(false).build() {
            let entry = entry.map_err(|e| FillError::Walk(target.clone(), e))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            let rel = path.strip_prefix(target).unwrap_or(&path);
            if matcher.is_match(rel) || path.file_name().is_some_and(|n| matcher.is_match(n)) {
                found.push(path);
            }
        }
        found.sort();
        for path in found {
            push(path, &mut files);
        }
    }
    Ok(files)
}
