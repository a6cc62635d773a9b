//! Manifest records and their source-text form.
//!
//! The manifest is handled as data: parse the embedded JSON block into records, edit the
//! list, render the whole file again. The registration code below the block is derived
//! output and never parsed.

use crate::foundation::core::Canvas;
use crate::foundation::error::{FramegateError, FramegateResult};

const BLOCK_OPEN: &str = "/* framegate:manifest";
const BLOCK_CLOSE: &str = "framegate:manifest */";

/// One registered composition.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRecord {
    /// Composition id.
    pub name: String,
    /// Component module path relative to the manifest (`./compositions/...`).
    pub template_path: String,
    /// Length in frames.
    pub duration: u64,
    /// Whether the module exports `schema`.
    pub has_schema: bool,
}

impl CompositionRecord {
    /// Reject names and paths that cannot be emitted safely.
    pub fn validate(&self) -> FramegateResult<()> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(FramegateError::manifest(format!(
                "composition name '{}' must be non-empty [A-Za-z0-9_-]",
                self.name
            )));
        }
        let bad = ['\'', '"', '`', '\n', '\r'];
        if self.template_path.is_empty()
            || self.template_path.contains(bad)
            || self.template_path.contains("*/")
        {
            return Err(FramegateError::manifest(format!(
                "template path for '{}' is empty or contains quotes, newlines or '*/'",
                self.name
            )));
        }
        if self.duration == 0 {
            return Err(FramegateError::manifest(format!(
                "composition '{}' must last at least one frame",
                self.name
            )));
        }
        Ok(())
    }
}

/// Parsed manifest: output format plus the ordered record list.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    /// Frames per second emitted for every composition.
    pub fps: u32,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Registered compositions in insertion order.
    pub records: Vec<CompositionRecord>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new(30, Canvas::LANDSCAPE)
    }
}

impl Manifest {
    /// Empty manifest.
    pub fn new(fps: u32, canvas: Canvas) -> Self {
        Self {
            fps,
            width: canvas.width,
            height: canvas.height,
            records: Vec::new(),
        }
    }

    /// Parse manifest text. Empty text yields `defaults`.
    pub fn parse(text: &str, defaults: &Manifest) -> FramegateResult<Self> {
        if text.trim().is_empty() {
            return Ok(defaults.clone());
        }
        let start = text
            .find(BLOCK_OPEN)
            .ok_or_else(|| FramegateError::manifest("missing framegate:manifest block"))?
            + BLOCK_OPEN.len();
        let len = text[start..]
            .find(BLOCK_CLOSE)
            .ok_or_else(|| FramegateError::manifest("unterminated framegate:manifest block"))?;
        let parsed: Manifest = serde_json::from_str(&text[start..start + len])
            .map_err(|e| FramegateError::manifest(format!("parse manifest block: {e}")))?;
        for r in &parsed.records {
            r.validate()?;
        }
        Ok(parsed)
    }

    /// Render the full manifest source.
    pub fn render(&self) -> FramegateResult<String> {
        let block = serde_json::to_string_pretty(self)
            .map_err(|e| FramegateError::serde(format!("serialize manifest: {e}")))?;

        let mut out = String::new();
        out.push_str("// Generated by framegate. Edit through the manifest API, not by hand.\n");
        out.push_str(BLOCK_OPEN);
        out.push('\n');
        out.push_str(&block);
        out.push('\n');
        out.push_str(BLOCK_CLOSE);
        out.push_str("\n\nimport React from 'react';\nimport {Composition} from 'remotion';\n");
        for (i, r) in self.records.iter().enumerate() {
            if r.has_schema {
                out.push_str(&format!(
                    "import {{Component as C{i}, schema as S{i}}} from '{}';\n",
                    import_path(&r.template_path)
                ));
            } else {
                out.push_str(&format!(
                    "import {{Component as C{i}}} from '{}';\n",
                    import_path(&r.template_path)
                ));
            }
        }
        out.push_str("\nexport const RemotionRoot: React.FC = () => {\n  return (\n    <>\n");
        for (i, r) in self.records.iter().enumerate() {
            let schema = if r.has_schema {
                format!(" schema={{S{i}}}")
            } else {
                String::new()
            };
            out.push_str(&format!(
                "      <Composition id=\"{}\" component={{C{i}}} durationInFrames={{{}}} \
                 fps={{{}}} width={{{}}} height={{{}}}{schema} />\n",
                r.name, r.duration, self.fps, self.width, self.height
            ));
        }
        out.push_str("    </>\n  );\n};\n");
        Ok(out)
    }

    /// Insert or replace records by name; new names append in order.
    pub fn upsert(&mut self, records: impl IntoIterator<Item = CompositionRecord>) -> FramegateResult<()> {
        for record in records {
            record.validate()?;
            match self.records.iter_mut().find(|r| r.name == record.name) {
                Some(slot) => *slot = record,
                None => self.records.push(record),
            }
        }
        Ok(())
    }

    /// Keep only records that pass `keep`. Returns the removed names.
    pub fn retain(&mut self, mut keep: impl FnMut(&CompositionRecord) -> bool) -> Vec<String> {
        let mut removed = Vec::new();
        self.records.retain(|r| {
            let k = keep(r);
            if !k {
                removed.push(r.name.clone());
            }
            k
        });
        removed
    }

    /// Remove one record by name. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        !self.retain(|r| r.name != name).is_empty()
    }

    /// Record for `name`.
    pub fn get(&self, name: &str) -> Option<&CompositionRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

fn import_path(template_path: &str) -> &str {
    template_path
        .strip_suffix(".tsx")
        .or_else(|| template_path.strip_suffix(".ts"))
        .unwrap_or(template_path)
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/record.rs"]
mod tests;
