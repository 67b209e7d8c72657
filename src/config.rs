use crate::debugger::error::Error;
use crate::muted_error;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// Build-system collaborator used to resolve paths reported by gdb.
pub trait BuildConfig: Send + Sync {
    /// Directory that relative paths in debug info are relative to.
    fn builddir(&self) -> Option<PathBuf>;

    /// Map a path as seen by the build (or the target) to the path in the
    /// source tree. [`None`] keeps the path as is.
    fn translate_file(&self, path: &Path) -> Option<PathBuf>;
}

/// User configuration, loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Gdb executable name or path.
    pub gdb: String,
    /// Extra arguments passed to gdb before `--args`.
    pub gdb_args: Vec<String>,
    pub builddir: Option<PathBuf>,
    /// Build (or target) path prefix to source tree prefix.
    pub source_map: BTreeMap<String, String>,
    /// Log raw MI traffic.
    pub trace_wire: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gdb: "gdb".to_string(),
            gdb_args: vec![],
            builddir: None,
            source_map: BTreeMap::new(),
            trace_wire: false,
        }
    }
}

impl Config {
    const DEFAULT_PATH: &'static str = ".config/midriver/config.toml";

    /// Load configuration from file. If `path` is [`None`] the default location
    /// in the home directory is used, a missing default file gives the default config.
    pub fn from_file(path: Option<&Path>) -> Result<Self, Error> {
        let data = match path {
            None => {
                let Some(home) = home::home_dir() else {
                    return Ok(Self::default());
                };
                match muted_error!(read_to_string(home.join(Self::DEFAULT_PATH))) {
                    Some(data) => data,
                    None => return Ok(Self::default()),
                }
            }
            Some(path) => read_to_string(path)?,
        };

        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, Error> {
        Ok(toml::de::from_str(data)?)
    }

    pub fn build_tree(&self) -> BuildTree {
        BuildTree {
            builddir: self.builddir.clone(),
            source_map: SourceMap::new(
                self.source_map
                    .iter()
                    .map(|(from, to)| (from.as_str(), to.as_str())),
            ),
        }
    }
}

/// Prefix based path rewriting, the longest matching prefix wins.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    mapping: Vec<(String, String)>,
}

impl SourceMap {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut mapping: Vec<_> = pairs
            .into_iter()
            .map(|(from, to)| (Self::norm_prefix(from), to.to_string()))
            .collect();
        mapping.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { mapping }
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Rewrite path prefix, [`None`] if no prefix matches.
    pub fn apply(&self, path: &str) -> Option<String> {
        self.mapping.iter().find_map(|(from, to)| {
            let suffix = path
                .strip_prefix(from.as_str())
                .or_else(|| (path == from.trim_end_matches('/')).then_some(""))?;
            Some(Self::join(to, suffix))
        })
    }

    fn join(prefix: &str, suffix: &str) -> String {
        if suffix.is_empty() {
            return prefix.to_string();
        }
        let mut out = prefix.to_string();
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(suffix);
        out
    }

    fn norm_prefix(s: &str) -> String {
        let mut out = s.to_string();
        if !out.ends_with('/') {
            out.push('/');
        }
        out
    }
}

/// [`BuildConfig`] backed by user configuration.
#[derive(Debug, Default, Clone)]
pub struct BuildTree {
    builddir: Option<PathBuf>,
    source_map: SourceMap,
}

impl BuildTree {
    pub fn new(builddir: Option<PathBuf>, source_map: SourceMap) -> Self {
        Self {
            builddir,
            source_map,
        }
    }
}

impl BuildConfig for BuildTree {
    fn builddir(&self) -> Option<PathBuf> {
        self.builddir.clone()
    }

    fn translate_file(&self, path: &Path) -> Option<PathBuf> {
        self.source_map
            .apply(path.to_str()?)
            .map(PathBuf::from)
    }
}
