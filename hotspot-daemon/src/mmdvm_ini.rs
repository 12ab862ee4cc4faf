//! MMDVMHost INI configuration -- read, coerce, merge and write back.
//!
//! The file is kept as an ordered list of sections so that a write-back
//! preserves the original section and key order. Comments and blank lines
//! are not preserved.
//!
//! # Value coercion
//!
//! - `true` / `false` (any case) become JSON booleans
//! - a value whose canonical number rendering equals the text becomes a number
//!   (`1`, `-3`, `0.5`; not `007`, `1.0`, `1e3`)
//! - everything else stays a string

use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};

/// INI read/write failures.
#[derive(Debug, thiserror::Error)]
pub enum IniError {
    /// The file could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("Cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single coerced INI value.
#[derive(Debug, Clone, PartialEq)]
pub enum IniValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl IniValue {
    /// Coerce raw INI text into a typed value.
    pub fn coerce(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        match raw.parse::<f64>() {
            Ok(num) if render_number(num).as_deref() == Some(raw) => Self::Number(num),
            _ => Self::Text(raw.to_owned()),
        }
    }

    /// Convert a JSON request value into an INI value.
    ///
    /// Nested arrays and objects are stored as their compact JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) if render_number(f).is_some() => Self::Number(f),
                _ => Self::Text(n.to_string()),
            },
            Value::String(s) => Self::Text(s.clone()),
            Value::Null => Self::Text("null".to_owned()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// JSON representation for the API.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(f) => {
                if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                    Value::Number(Number::from(*f as i64))
                } else {
                    Number::from_f64(*f).map_or(Value::Null, Value::Number)
                }
            }
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Text written back to the INI file.
    pub fn to_ini_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(f) => render_number(*f).unwrap_or_else(|| f.to_string()),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Canonical decimal rendering of a number, or `None` where the canonical
/// form would use exponent notation or the value is not finite.
fn render_number(num: f64) -> Option<String> {
    if !num.is_finite() {
        return None;
    }
    if num == 0.0 {
        return Some("0".to_owned());
    }
    let abs = num.abs();
    if !(1e-6..1e21).contains(&abs) {
        return None;
    }
    Some(format!("{num}"))
}

/// One `[section]` with its ordered `key=value` entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IniSection {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl IniSection {
    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_owned(), value)),
        }
    }

    /// Raw value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Ordered INI document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Parse INI text.
    ///
    /// `;` and `#` lines are comments. Key/value lines before the first
    /// section header are ignored. Repeated sections are merged and a
    /// repeated key keeps its first position with the last value.
    pub fn parse(content: &str) -> Self {
        let mut doc = Self::default();
        let mut current: Option<usize> = None;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .filter(|name| !name.is_empty() && !name.contains(']'))
            {
                current = Some(doc.section_index(name));
                continue;
            }

            let Some(index) = current else { continue };
            if let Some((key, value)) = trimmed.split_once('=') {
                if key.is_empty() {
                    continue;
                }
                doc.sections[index].set(key.trim(), value.trim().to_owned());
            }
        }

        doc
    }

    fn section_index(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(IniSection {
                    name: name.to_owned(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        }
    }

    /// Sections in file order.
    pub fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// `{section: {key: coerced value}}` for the API.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for section in &self.sections {
            let entries: Map<String, Value> = section
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), IniValue::coerce(v).to_json()))
                .collect();
            root.insert(section.name.clone(), Value::Object(entries));
        }
        Value::Object(root)
    }

    /// Merge a `{section: {key: value}}` patch into the document.
    ///
    /// Existing values are normalized through coercion first, so `TRUE`
    /// is written back as `true`. Non-object section values in the patch
    /// are ignored.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for section in &mut self.sections {
            for entry in &mut section.entries {
                entry.1 = IniValue::coerce(&entry.1).to_ini_string();
            }
        }

        for (name, entries) in patch {
            let Value::Object(entries) = entries else {
                continue;
            };
            let index = self.section_index(name);
            for (key, value) in entries {
                self.sections[index].set(key, IniValue::from_json(value).to_ini_string());
            }
        }
    }

    /// Render as INI text: each section followed by a blank line.
    pub fn to_ini_string(&self) -> String {
        let mut lines = Vec::new();
        for section in &self.sections {
            lines.push(format!("[{}]", section.name));
            for (key, value) in &section.entries {
                lines.push(format!("{key}={value}"));
            }
            lines.push(String::new());
        }
        lines.join("\n")
    }
}

/// Handle to the MMDVMHost INI file on disk.
#[derive(Debug, Clone)]
pub struct MmdvmIni {
    path: PathBuf,
}

impl MmdvmIni {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    pub async fn read(&self) -> Result<IniDocument, IniError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| IniError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(IniDocument::parse(&content))
    }

    /// Replace the file with the rendered document.
    pub async fn write(&self, doc: &IniDocument) -> Result<(), IniError> {
        tokio::fs::write(&self.path, doc.to_ini_string())
            .await
            .map_err(|source| IniError::Write {
                path: self.path.display().to_string(),
                source,
            })
    }

    /// Read, merge the patch and write back.
    pub async fn update(&self, patch: &Map<String, Value>) -> Result<(), IniError> {
        let mut doc = self.read().await?;
        doc.merge(patch);
        self.write(&doc).await?;
        tracing::info!(path = %self.path.display(), sections = patch.len(), "MMDVMHost config updated");
        Ok(())
    }
}
