// ── Template directory source ──

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use climate_skill_core::{CoreError, TemplateSource};

/// Loads response templates from `<dir>/<name>`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TemplateSource for DirectoryTemplates {
    fn load(&self, name: &str) -> Result<Option<String>, CoreError> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Template {
                name: name.to_owned(),
                message: format!("cannot read {}: {e}", path.display()),
            }),
        }
    }
}
