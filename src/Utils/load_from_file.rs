use crate::config::{ConfigError, SystemConfig};
use log::{error, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Header that may introduce the system block in a multi-section case file
pub const SYSTEM_HEADER: &str = "SYSTEM";

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }
    pub fn load_system(&self) -> Result<SystemConfig, ConfigError> {
        load_config_from_file(&self.file_name)
    }
}

/// A header line is a non-empty line of capitals and underscores only
fn is_header(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

/// Returns the lines of the section under `header` and the index of its first line.
/// A file without any header is taken whole.
fn locate_section<'a>(lines: &'a [String], header: &str, file_name: &str) -> Result<(&'a [String], usize), ConfigError> {
    let start = match lines.iter().position(|l| l.trim().eq_ignore_ascii_case(header)) {
        Some(i) => i + 1,
        None if lines.iter().any(|l| is_header(l)) => {
            return Err(ConfigError::invalid(
                file_name,
                format!("no '{}' header among the sections of the file", header),
            ));
        }
        None => 0,
    };
    let end = (start..lines.len())
        .find(|&i| is_header(&lines[i]))
        .unwrap_or(lines.len());
    Ok((&lines[start..end], start))
}

/// Reads a `SystemConfig` from a JSON document, optionally placed under a `SYSTEM`
/// header. Parse errors are logged with the offending line of the file.
pub fn load_config_from_file(file_name: &str) -> Result<SystemConfig, ConfigError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(ConfigError::invalid(file_name, "file does not exist"));
    }
    let reader = BufReader::new(File::open(path)?);
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
    let (section, offset) = locate_section(&lines, SYSTEM_HEADER, file_name)?;
    let text = section.join("\n");
    if text.trim().is_empty() {
        warn!("'{}' has an empty {} section", file_name, SYSTEM_HEADER);
    }
    match SystemConfig::from_json_str(&text) {
        Ok(cfg) => {
            info!(
                "loaded {} phase(s) from '{}', flux scheme {}",
                cfg.phases.len(),
                file_name,
                cfg.flux_scheme
            );
            Ok(cfg)
        }
        Err(ConfigError::Serde(e)) => {
            report_parse_error(&lines, offset, &e, file_name);
            Err(ConfigError::Serde(e))
        }
        Err(e) => {
            error!("invalid configuration in '{}': {}", file_name, e);
            Err(e)
        }
    }
}

fn report_parse_error(lines: &[String], offset: usize, e: &serde_json::Error, file_name: &str) {
    let (line, column) = (e.line(), e.column());
    let actual_line = offset + line.saturating_sub(1);
    error!(
        "Error parsing '{}' at line {}, column {} (line {} in file): {}",
        file_name,
        line,
        column,
        actual_line + 1,
        e
    );
    if let Some(problem_line) = lines.get(actual_line) {
        error!("Problematic line: {}", problem_line);
        if column >= 1 && column <= problem_line.len() + 1 {
            error!("{}^", " ".repeat(column - 1));
        }
    }
}
