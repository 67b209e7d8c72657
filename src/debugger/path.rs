use crate::config::BuildConfig;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolve paths reported by gdb to paths in the source tree.
#[derive(Clone, Default)]
pub struct PathTranslator {
    builddir: Option<PathBuf>,
    build_config: Option<Arc<dyn BuildConfig>>,
}

impl Debug for PathTranslator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathTranslator")
            .field("builddir", &self.builddir)
            .field("build_config", &self.build_config.is_some())
            .finish()
    }
}

impl PathTranslator {
    pub fn new(build_config: Option<Arc<dyn BuildConfig>>) -> Self {
        Self {
            builddir: build_config.as_ref().and_then(|c| c.builddir()),
            build_config,
        }
    }

    pub fn with_builddir(builddir: impl Into<PathBuf>) -> Self {
        Self {
            builddir: Some(builddir.into()),
            build_config: None,
        }
    }

    pub fn override_builddir(self, builddir: impl Into<PathBuf>) -> Self {
        Self {
            builddir: Some(builddir.into()),
            ..self
        }
    }

    pub fn builddir(&self) -> Option<&Path> {
        self.builddir.as_deref()
    }

    /// Translate a raw gdb path: decode octal escapes, resolve relative paths against
    /// the build directory, then apply build config translation if any.
    pub fn translate_path(&self, raw: &str) -> String {
        let decoded = decode_octal(raw);

        let mut path = PathBuf::from(&decoded);
        if !path.is_absolute() {
            if let Some(builddir) = &self.builddir {
                path = builddir.join(path);
            }
        }

        if let Some(translated) = self
            .build_config
            .as_ref()
            .and_then(|c| c.translate_file(&path))
        {
            path = translated;
        }

        path.to_string_lossy().into_owned()
    }

    /// Pick a source path for a location that has both `file` and `fullname`:
    /// the fullname if it exists on disk, the file otherwise.
    pub fn choose_file(&self, file: Option<&str>, fullname: Option<&str>) -> Option<String> {
        let file = file.map(|f| self.translate_path(f));
        let fullname = fullname.map(|f| self.translate_path(f));

        match (file, fullname) {
            (_, Some(fullname)) if Path::new(&fullname).exists() => Some(fullname),
            (Some(file), _) => Some(file),
            (None, fullname) => fullname,
        }
    }

    /// Make path relative to the build directory if it lies inside it.
    pub fn relative_to_builddir(&self, path: &str) -> String {
        self.builddir
            .as_ref()
            .and_then(|dir| Path::new(path).strip_prefix(dir).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(|rel| rel.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string())
    }
}

/// Decode `\nnn` octal escapes to raw bytes, other bytes pass through.
fn decode_octal(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() && is_octal_escape(&bytes[i + 1..i + 4]) {
            let b = bytes[i + 1..i + 4]
                .iter()
                .fold(0u32, |acc, d| acc * 8 + (d - b'0') as u32);
            out.push(b as u8);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits.len() == 3 && digits.iter().all(|d| (b'0'..=b'7').contains(d)) && digits[0] <= b'3'
}
