use std::collections::BTreeMap;

use crate::foundation::error::{FramegateError, FramegateResult};

/// Placeholder values keyed by name (`TOTAL_FRAMES`, `PALETTE_PRIMARY`, ...).
#[derive(Clone, Debug, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `value`, replacing any previous binding.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Value bound to `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Substitute every `{{KEY}}` in `skeleton`.
///
/// Unknown keys and unterminated markers fail the whole render; nothing partial is returned.
pub fn render_template(skeleton: &str, ctx: &TemplateContext) -> FramegateResult<String> {
    let mut out = String::with_capacity(skeleton.len() + 256);
    let mut rest = skeleton;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or_else(|| {
            FramegateError::validation(format!(
                "unterminated placeholder at byte {}",
                skeleton.len() - rest.len() + open
            ))
        })?;
        let key = after[..close].trim();
        let value = ctx
            .get(key)
            .ok_or_else(|| FramegateError::validation(format!("unknown placeholder '{key}'")))?;
        out.push_str(value);
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Quote `s` as a JSON string literal, which is also a valid TS/JS string literal.
pub fn string_literal(s: &str) -> FramegateResult<String> {
    serde_json::to_string(s).map_err(|e| FramegateError::serde(format!("quote string: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/generate/codegen.rs"]
mod tests;
