use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub mod config;
mod cst;
mod diagnostics;
pub mod lexer;
pub mod surface;
mod syntax;
pub mod tracing_config;

pub use config::{load_options, ParseOptions, Reduction};
pub use cst::{CstFile, CstToken};
pub use diagnostics::{
    merge_span, render_diagnostic, render_diagnostics, Diagnostic, DiagnosticLabel,
    DiagnosticSeverity, FileDiagnostic, LineIndex, Position, Span,
};
pub use lexer::{lex, lex_cst, token_stream, Token, TokenKind, TokenSource, TokenStream};
pub use surface::{
    parse_expr_source, parse_program_source, Expr, Parser, Stmt, Terminator, TerminatorKind,
};

/// File extension of source files picked up by directory targets.
pub const SOURCE_EXTENSION: &str = "esc";

#[derive(Debug, thiserror::Error)]
pub enum EscError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    /// Input parsed with errors; the diagnostics were already reported.
    #[error("parse produced diagnostics")]
    Diagnostics,
}

#[derive(Debug, Serialize)]
pub struct ParsedFile {
    pub path: String,
    #[serde(skip)]
    pub source: String,
    pub statements: Vec<Stmt>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedFile {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == DiagnosticSeverity::Error)
    }

    pub fn render_diagnostics(&self) -> String {
        render_diagnostics(&self.path, &self.source, &self.diagnostics)
    }

    pub fn file_diagnostics(&self) -> Vec<FileDiagnostic> {
        self.diagnostics
            .iter()
            .map(|diagnostic| FileDiagnostic {
                path: self.path.clone(),
                diagnostic: diagnostic.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct ParseBundle {
    pub files: Vec<ParsedFile>,
}

impl ParseBundle {
    pub fn has_errors(&self) -> bool {
        self.files.iter().any(ParsedFile::has_errors)
    }
}

pub fn parse_source(path: &str, content: &str, options: ParseOptions) -> ParsedFile {
    let (statements, diagnostics) = parse_program_source(content, options);
    ParsedFile {
        path: path.to_string(),
        source: content.to_string(),
        statements,
        diagnostics,
    }
}

pub fn parse_file(path: &Path, options: ParseOptions) -> Result<ParsedFile, EscError> {
    let content = fs::read_to_string(path)?;
    Ok(parse_source(&path.display().to_string(), &content, options))
}

/// Parses a file, a directory (its direct `.esc` children), or `dir/...` (recursive).
pub fn parse_target(target: &str, options: ParseOptions) -> Result<ParseBundle, EscError> {
    let paths = expand_target(target)?;
    tracing::debug!(target, files = paths.len(), "parsing target");
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(parse_file(&path, options)?);
    }
    Ok(ParseBundle { files })
}

pub fn lex_file(path: &Path) -> Result<CstFile, EscError> {
    let content = fs::read_to_string(path)?;
    let (tokens, diagnostics) = lex_cst(&content);
    Ok(CstFile {
        path: path.display().to_string(),
        byte_count: content.len(),
        line_count: content.lines().count(),
        tokens,
        diagnostics,
        source: content,
    })
}

fn expand_target(target: &str) -> Result<Vec<PathBuf>, EscError> {
    let mut paths = Vec::new();
    let (base, recursive) = match target.strip_suffix("/...") {
        Some(base) => (if base.is_empty() { "." } else { base }, true),
        None => (target, false),
    };

    let Some(path) = resolve_target_path(base) else {
        return Err(EscError::InvalidPath(target.to_string()));
    };

    if path.is_file() {
        return Ok(vec![path]);
    }

    if path.is_dir() {
        if recursive {
            collect_files(&path, &mut paths)?;
        } else {
            for entry in fs::read_dir(&path)? {
                let entry_path = entry?.path();
                if entry_path.is_file() && is_source_file(&entry_path) {
                    paths.push(entry_path);
                }
            }
        }
    }

    paths.sort();
    if paths.is_empty() {
        return Err(EscError::InvalidPath(target.to_string()));
    }

    Ok(paths)
}

fn resolve_target_path(target: &str) -> Option<PathBuf> {
    let target_path = Path::new(target);
    if target_path.exists() {
        return Some(target_path.to_path_buf());
    }
    if target_path.is_absolute() {
        return None;
    }

    // Relative targets also resolve against the nearest directory holding an `esc.toml`.
    let mut dir = std::env::current_dir().ok()?;
    loop {
        if dir.join(config::CONFIG_FILE_NAME).exists() {
            let candidate = dir.join(target);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        dir = dir.parent()?.to_path_buf();
    }
}

fn collect_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), EscError> {
    for entry in fs::read_dir(dir)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            collect_files(&entry_path, paths)?;
            continue;
        }
        if is_source_file(&entry_path) {
            paths.push(entry_path);
        }
    }
    Ok(())
}

fn is_source_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_collects_statements_and_diagnostics() {
        let parsed = parse_source("inline.esc", "val x = 1\nval = 2", ParseOptions::default());
        assert_eq!(parsed.statements.len(), 1);
        assert!(parsed.has_errors());
        let file_diags = parsed.file_diagnostics();
        assert_eq!(file_diags.len(), 1);
        assert_eq!(file_diags[0].path, "inline.esc");
        assert_eq!(file_diags[0].diagnostic.code, "E2101");
    }

    #[test]
    fn directory_targets_only_pick_up_source_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.esc"), "val b = 2").expect("write");
        fs::write(dir.path().join("a.esc"), "val a = 1").expect("write");
        fs::write(dir.path().join("notes.txt"), "not source").expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested/c.esc"), "val c = 3").expect("write");

        let target = dir.path().display().to_string();
        let flat = expand_target(&target).expect("flat");
        let names: Vec<_> = flat
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["a.esc", "b.esc"]);

        let recursive = expand_target(&format!("{target}/...")).expect("recursive");
        assert_eq!(recursive.len(), 3);
    }

    #[test]
    fn json_failures_convert_into_esc_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated json");
        let err = EscError::from(err);
        assert!(matches!(err, EscError::Json(_)));
        assert!(err.to_string().starts_with("JSON error: "));
    }

    #[test]
    fn missing_target_is_an_invalid_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.esc").display().to_string();
        assert!(matches!(
            parse_target(&missing, ParseOptions::default()),
            Err(EscError::InvalidPath(path)) if path == missing
        ));
    }
}
