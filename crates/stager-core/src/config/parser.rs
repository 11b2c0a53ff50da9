//! TOML parser with helpful error messages

use std::path::Path;

use super::schema::StageConfig;
use crate::error::{Result, StageError};

/// Parse a stager.toml file
pub fn parse_stage_toml(path: &Path) -> Result<StageConfig> {
    let content =
        std::fs::read_to_string(path).map_err(|e| StageError::io("read config", path, e))?;

    parse_stage_toml_str(&content).map_err(|message| StageError::Config {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse stager.toml content from string
pub fn parse_stage_toml_str(content: &str) -> std::result::Result<StageConfig, String> {
    let config: StageConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(&e, content))?;
    config.validate()?;
    Ok(config)
}

/// Attach the offending lines to a TOML error
fn enhance_toml_error(error: &toml::de::Error, content: &str) -> String {
    let message = error.message().to_string();
    let Some(span) = error.span() else {
        return format!("TOML parsing error: {message}");
    };

    let line_num = content[..span.start.min(content.len())]
        .matches('\n')
        .count()
        + 1;
    format!(
        "TOML parsing error at line {}:\n{}\n\nError: {}",
        line_num,
        get_line_context(content, line_num),
        message
    )
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
