//! Portable-text block validation
//!
//! A block is an object with an array of `children` spans. Every mark on a
//! span must either name a decorator of the block type or the `_key` of an
//! entry in the block's `markDefs`.

use super::item_segment;
use crate::document::ValidationContext;
use crate::foundation::{Path, ValidationError, Verdict};
use crate::rule::CustomValidator;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// Decorators available when a block type declares none.
pub const DEFAULT_DECORATORS: [&str; 5] = ["strong", "em", "code", "underline", "strike-through"];

/// Structural validator for block values.
#[derive(Debug, Clone)]
pub struct BlockValidator {
    decorators: Vec<String>,
}

impl BlockValidator {
    /// Creates a validator accepting the given decorators.
    pub fn new<I, S>(decorators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            decorators: decorators.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for BlockValidator {
    fn default() -> Self {
        Self::new(DEFAULT_DECORATORS)
    }
}

#[async_trait]
impl CustomValidator for BlockValidator {
    async fn validate(
        &self,
        value: Option<&Value>,
        _context: &ValidationContext<'_>,
    ) -> anyhow::Result<Verdict> {
        let Some(block) = value.and_then(Value::as_object) else {
            return Ok(Verdict::Valid);
        };
        let Some(children) = block.get("children").and_then(Value::as_array) else {
            return Ok("Block must have an array of children".into());
        };

        let annotations: HashSet<&str> = block
            .get("markDefs")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|definition| definition.get("_key")?.as_str())
            .collect();

        let mut problems = Vec::new();
        for (index, child) in children.iter().enumerate() {
            let marks = child.get("marks").and_then(Value::as_array).into_iter().flatten();
            for mark in marks.filter_map(Value::as_str) {
                if annotations.contains(mark) || self.decorators.iter().any(|d| d == mark) {
                    continue;
                }
                let path = Path::root()
                    .child("children")
                    .child(item_segment(child, index))
                    .child("marks");
                problems.push(Verdict::Error(
                    ValidationError::new(format!(
                        "Mark \"{mark}\" does not match a decorator or an annotation"
                    ))
                    .with_path(path),
                ));
            }
        }
        Ok(Verdict::Many(problems))
    }
}
