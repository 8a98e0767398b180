use crate::parser::{KlsFile, Parser};
use keylayer_core::KlsError;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves `include("...")` directives of KLS scripts
pub struct IncludeProcessor {
    /// Canonical paths on the current include chain
    processed_files: HashSet<PathBuf>,
    /// Fallback directory for relative includes
    base_dir: Option<PathBuf>,
}

impl IncludeProcessor {
    pub fn new() -> Self {
        Self {
            processed_files: HashSet::new(),
            base_dir: None,
        }
    }

    pub fn with_base_dir<P: AsRef<Path>>(mut self, base_dir: P) -> Self {
        self.base_dir = Some(base_dir.as_ref().to_path_buf());
        self
    }

    /// Parse a KLS file and every file it includes
    pub fn process_file(&mut self, file_path: &Path) -> Result<KlsFile, KlsError> {
        let canonical_path = file_path
            .canonicalize()
            .map_err(|_| KlsError::IncludeNotFound(file_path.display().to_string()))?;

        if self.processed_files.contains(&canonical_path) {
            return Err(KlsError::Parse {
                line: 0,
                message: format!("Circular include detected: {}", file_path.display()),
            });
        }

        self.processed_files.insert(canonical_path.clone());
        debug!("Processing {}", file_path.display());

        let content = fs::read_to_string(file_path)?;
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);

        let mut ast = Parser::new(content).parse()?;

        if !ast.includes.is_empty() {
            let file_dir = file_path
                .parent()
                .or(self.base_dir.as_deref())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();

            ast = self.process_includes(ast, &file_dir)?;
        }

        self.processed_files.remove(&canonical_path);
        Ok(ast)
    }

    /// Parse KLS source text, resolving includes against `base_dir`
    pub fn process_string(&mut self, content: &str, base_dir: Option<&Path>) -> Result<KlsFile, KlsError> {
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
        let mut ast = Parser::new(content).parse()?;

        if !ast.includes.is_empty() {
            let dir = base_dir
                .or(self.base_dir.as_deref())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();

            ast = self.process_includes(ast, &dir)?;
        }

        Ok(ast)
    }

    /// Included declarations follow the including file's own; options of
    /// the including file win.
    fn process_includes(&mut self, mut ast: KlsFile, base_dir: &Path) -> Result<KlsFile, KlsError> {
        let includes = std::mem::take(&mut ast.includes);

        for include_path in includes {
            let resolved_path = if Path::new(&include_path).is_absolute() {
                PathBuf::from(&include_path)
            } else {
                base_dir.join(&include_path)
            };

            if !resolved_path.exists() {
                return Err(KlsError::IncludeNotFound(include_path));
            }

            let included_ast = self.process_file(&resolved_path)?;
            for (key, value) in &included_ast.options {
                ast.options.entry(key.clone()).or_insert_with(|| value.clone());
            }
            ast.extend(included_ast);
        }

        Ok(ast)
    }
}

impl Default for IncludeProcessor {
    fn default() -> Self {
        Self::new()
    }
}
