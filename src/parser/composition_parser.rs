//! Decoder for the persisted composition shape.
//!
//! The persisted shape is loosely typed (older records store block content
//! as arbitrary JSON), so decoding goes through [`serde_json::Value`] and
//! checks each block by hand.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{Block, BlockKind, Composition, StyleConfig};

use super::options::ParseOptions;

/// Composition parser.
pub struct CompositionParser {
    value: Value,
    options: ParseOptions,
}

impl CompositionParser {
    /// Read a composition JSON file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Read a composition JSON file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse composition JSON from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse composition JSON from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let value = serde_json::from_slice(data)
            .map_err(|e| Error::InvalidComposition(format!("malformed JSON: {}", e)))?;
        Ok(Self::from_value_with_options(value, options))
    }

    /// Parse composition JSON from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse composition JSON from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Self> {
        let value = serde_json::from_reader(reader)
            .map_err(|e| Error::InvalidComposition(format!("malformed JSON: {}", e)))?;
        Ok(Self::from_value_with_options(value, options))
    }

    /// Wrap an already-decoded JSON value.
    pub fn from_value_with_options(value: Value, options: ParseOptions) -> Self {
        Self { value, options }
    }

    /// Validate and convert into a [`Composition`] with normalized order.
    pub fn parse(self) -> Result<Composition> {
        let root = self.value.as_object().ok_or_else(|| {
            Error::InvalidComposition(format!(
                "expected an object at the top level, found {}",
                type_name(&self.value)
            ))
        })?;

        let blocks_value = root
            .get("blocks")
            .or_else(|| root.get("sections"))
            .ok_or_else(|| Error::InvalidComposition("missing `blocks`".to_string()))?;
        let items = blocks_value.as_array().ok_or_else(|| {
            Error::InvalidComposition(format!(
                "`blocks` must be an array, found {}",
                type_name(blocks_value)
            ))
        })?;

        let style = self.parse_style(root)?;

        let mut blocks = Vec::with_capacity(items.len());
        let mut seen_ids = HashSet::new();
        for (position, item) in items.iter().enumerate() {
            match self.parse_block(item, position) {
                Ok(block) => {
                    if !seen_ids.insert(block.id) {
                        self.reject(format!("duplicate block id {}", block.id))?;
                        continue;
                    }
                    blocks.push(block);
                }
                Err(Error::InvalidComposition(reason)) => {
                    self.reject(format!("block {}: {}", position, reason))?;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "parsed composition with {} of {} blocks",
            blocks.len(),
            items.len()
        );
        Ok(Composition::from_parts(blocks, style))
    }

    fn parse_style(&self, root: &Map<String, Value>) -> Result<StyleConfig> {
        match root.get("style").or_else(|| root.get("styles")) {
            None | Some(Value::Null) => Ok(StyleConfig::default()),
            Some(Value::Object(fields)) => {
                let fields: Map<String, Value> = fields
                    .iter()
                    .filter(|(name, value)| self.keep_style_field(name, value))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                serde_json::from_value(Value::Object(fields))
                    .map_err(|e| Error::InvalidComposition(format!("invalid style: {}", e)))
            }
            Some(other) => Err(Error::InvalidComposition(format!(
                "`style` must be an object, found {}",
                type_name(other)
            ))),
        }
    }

    /// Null fields fall back to defaults; lenient mode also drops non-string values.
    fn keep_style_field(&self, name: &str, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::String(_) => true,
            other if self.options.is_lenient() => {
                warn!("style.{}: ignoring {}", name, type_name(other));
                false
            }
            _ => true,
        }
    }

    fn parse_block(&self, item: &Value, position: usize) -> Result<Block> {
        let obj = item.as_object().ok_or_else(|| {
            Error::InvalidComposition(format!("expected an object, found {}", type_name(item)))
        })?;

        let id = obj
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| Error::InvalidComposition("missing or invalid `id`".to_string()))?;

        let kind_name = obj
            .get("type")
            .or_else(|| obj.get("kind"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidComposition("missing block type".to_string()))?;
        let kind: BlockKind = kind_name.parse().map_err(Error::InvalidComposition)?;

        let content = match obj.get("content") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) if self.options.is_lenient() => {
                Some(scalar.to_string())
            }
            Some(other) if self.options.is_lenient() => {
                warn!(
                    "block {}: dropping non-text content ({})",
                    id,
                    type_name(other)
                );
                None
            }
            Some(other) => {
                return Err(Error::InvalidComposition(format!(
                    "content must be a string or null, found {}",
                    type_name(other)
                )))
            }
        };

        let order = match obj.get("order") {
            None | Some(Value::Null) => position as u32,
            Some(value) => match value.as_u64().and_then(|o| u32::try_from(o).ok()) {
                Some(order) => order,
                None if self.options.is_lenient() => position as u32,
                None => {
                    return Err(Error::InvalidComposition(
                        "`order` must be a non-negative integer".to_string(),
                    ))
                }
            },
        };

        Ok(Block::new(id, kind, content, order))
    }

    fn reject(&self, reason: String) -> Result<()> {
        if self.options.is_lenient() {
            warn!("skipping {}", reason);
            Ok(())
        } else {
            Err(Error::InvalidComposition(reason))
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
