use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::EscError;

pub const CONFIG_FILE_NAME: &str = "esc.toml";

/// How pending binary operators are folded when a new operator arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reduction {
    /// Compare against the top of the operator stack once per incoming operator.
    ///
    /// Chains spanning three or more strictly decreasing precedence levels group
    /// differently from canonical left-to-right grouping, e.g. `a < b - c * d - e`
    /// folds `b - ((c * d) - e)`.
    #[default]
    SingleStep,
    /// Keep folding while the top of the stack binds at least as tightly.
    Cascading,
}

impl Reduction {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "single-step" => Some(Self::SingleStep),
            "cascading" => Some(Self::Cascading),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub reduction: Reduction,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EscToml {
    #[serde(default)]
    pub parser: ParseOptions,
}

pub fn read_esc_toml(path: &Path) -> Result<EscToml, EscError> {
    let text = std::fs::read_to_string(path)?;
    parse_esc_toml(&text)
        .map_err(|err| EscError::Config(format!("failed to parse {}: {err}", path.display())))
}

pub fn parse_esc_toml(text: &str) -> Result<EscToml, toml::de::Error> {
    toml::from_str(text)
}

/// Walks up from `start` looking for an `esc.toml`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        let Some(parent) = dir.parent() else {
            return None;
        };
        dir = parent.to_path_buf();
    }
}

/// Options from the nearest `esc.toml`, or the defaults when there is none.
pub fn load_options(start: &Path) -> Result<ParseOptions, EscError> {
    match find_config(start) {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading parser options");
            Ok(read_esc_toml(&path)?.parser)
        }
        None => Ok(ParseOptions::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_single_step() {
        let config = parse_esc_toml("").expect("parse");
        assert_eq!(config.parser.reduction, Reduction::SingleStep);
    }

    #[test]
    fn parser_table_selects_cascading() {
        let config = parse_esc_toml("[parser]\nreduction = \"cascading\"\n").expect("parse");
        assert_eq!(config.parser.reduction, Reduction::Cascading);
    }

    #[test]
    fn unknown_reduction_is_rejected() {
        assert!(parse_esc_toml("[parser]\nreduction = \"eager\"\n").is_err());
    }

    #[test]
    fn reduction_names_round_trip_through_cli_parser() {
        assert_eq!(Reduction::parse("single-step"), Some(Reduction::SingleStep));
        assert_eq!(Reduction::parse("cascading"), Some(Reduction::Cascading));
        assert_eq!(Reduction::parse("Cascading"), None);
    }

    #[test]
    fn load_options_walks_up_to_the_nearest_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[parser]\nreduction = \"cascading\"\n",
        )
        .expect("write config");
        let nested = dir.path().join("src/deep");
        std::fs::create_dir_all(&nested).expect("mkdir");

        let options = load_options(&nested).expect("load");
        assert_eq!(options.reduction, Reduction::Cascading);
        assert_eq!(
            find_config(&nested),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn malformed_config_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[parser\n").expect("write config");
        let err = read_esc_toml(&path).expect_err("malformed");
        assert!(matches!(err, EscError::Config(ref msg) if msg.contains("esc.toml")));
    }
}
