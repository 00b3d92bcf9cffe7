//! Resource lookup relative to a root directory, and the program cache.
//!
//! Failures here are never fatal: unreadable files come back empty and
//! programs that fail to build come back as `None`, with the cause
//! logged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::program::RenderProgram;

/// Loads text resources and caches compiled programs by name.
#[derive(Debug, Default)]
pub struct ResourceManager {
    root: PathBuf,
    programs: HashMap<String, Arc<RenderProgram>>,
}

impl ResourceManager {
    /// Resolve resources relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            programs: HashMap::new(),
        }
    }

    /// Resolve resources relative to the directory holding `executable`.
    #[must_use]
    pub fn from_executable(executable: &Path) -> Self {
        Self::new(executable.parent().unwrap_or_else(|| Path::new(".")))
    }

    /// Directory resources are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full contents of `relative`, or an empty string if it cannot be
    /// read.
    #[must_use]
    pub fn read_text(&self, relative: &str) -> String {
        let path = self.root.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("failed to open {}: {e}", path.display());
                String::new()
            }
        }
    }

    /// Build a program from two stage files and cache it under `name`.
    ///
    /// Returns `None` if either stage is missing, empty, or fails to
    /// compile. A failed load leaves any previously cached program of
    /// the same name in place.
    pub fn load_program(
        &mut self,
        name: &str,
        vertex_path: &str,
        fragment_path: &str,
    ) -> Option<Arc<RenderProgram>> {
        let vertex = self.read_text(vertex_path);
        if vertex.is_empty() {
            tracing::error!(program = name, "no vertex stage code in {vertex_path}");
            return None;
        }
        let fragment = self.read_text(fragment_path);
        if fragment.is_empty() {
            tracing::error!(program = name, "no fragment stage code in {fragment_path}");
            return None;
        }

        match RenderProgram::compile(&vertex, &fragment) {
            Ok(program) => {
                let program = Arc::new(program);
                self.programs.insert(name.to_owned(), Arc::clone(&program));
                tracing::debug!(program = name, "loaded render program");
                Some(program)
            }
            Err(e) => {
                tracing::error!(
                    program = name,
                    "cannot load render program (vertex: {vertex_path}, fragment: {fragment_path}): {e}"
                );
                None
            }
        }
    }

    /// A previously loaded program.
    #[must_use]
    pub fn program(&self, name: &str) -> Option<Arc<RenderProgram>> {
        let found = self.programs.get(name).cloned();
        if found.is_none() {
            tracing::warn!(program = name, "no such render program");
        }
        found
    }
}
