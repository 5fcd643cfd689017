use crate::model::ResourceNode;
use crate::services::trace::{to_node, Resource};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read trace input: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode trace JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("trace input is empty")]
    Empty,
}

pub fn get_by_path<'a>(v: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut cur = v;
    for seg in path.split('.') {
        cur = cur.get(seg)?;
    }
    Some(cur)
}

/// Parse trace JSON into a forest. `null` is an empty forest, an array is a
/// multi-root forest, an object is a single-root forest.
pub fn parse_trace(bytes: &[u8]) -> Result<Vec<ResourceNode>, IngestError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestError::Read(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    if text.trim().is_empty() {
        return Err(IngestError::Empty);
    }
    let forest = match decode_value(text)? {
        JsonValue::Null => Vec::new(),
        list @ JsonValue::Array(_) => serde_json::from_value::<Vec<Resource>>(list)?
            .iter()
            .map(to_node)
            .collect(),
        one => vec![to_node(&serde_json::from_value::<Resource>(one)?)],
    };
    Ok(forest)
}

/// Decode without serde_json's nesting cap; composition chains can be
/// arbitrarily deep.
fn decode_value(text: &str) -> Result<JsonValue, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = JsonValue::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

pub fn read_trace<R: Read>(mut r: R) -> Result<Vec<ResourceNode>, IngestError> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;
    parse_trace(&buf)
}
