//! Line-prefix extraction of the `:20:`, `:21:` and `:79:` fields of an
//! MT799 free-format message.
//!
//! Lines are split on `\n`, with a trailing `\r` dropped, so both LF and
//! CRLF documents work. A bare `\r` is not a line separator. Every other tag
//! and line is ignored, and a repeated tag keeps its last value.

use mt799_types::{ParsedMessage, Tag};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty message")]
    EmptyInput,

    #[error("missing required tags: {}", format_tags(.0))]
    MissingTags(Vec<Tag>),
}

fn format_tags(tags: &[Tag]) -> String {
    tags.iter().map(Tag::to_string).collect::<Vec<_>>().join(", ")
}

/// Extract the three required fields from `content`.
///
/// Fails without a partial result if any of the tags never appears.
pub fn parse(content: &str) -> Result<ParsedMessage, ParseError> {
    if content.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut fields: [Option<&str>; 3] = [None; 3];

    for line in content.lines() {
        for (slot, tag) in fields.iter_mut().zip(Tag::ALL) {
            if let Some(rest) = line.strip_prefix(tag.prefix()) {
                *slot = Some(rest.trim());
                break;
            }
        }
    }

    match fields {
        [Some(reference), Some(related_reference), Some(narrative)] => Ok(ParsedMessage {
            reference: reference.to_string(),
            related_reference: related_reference.to_string(),
            narrative: narrative.to_string(),
        }),
        _ => {
            let missing: Vec<Tag> = fields
                .iter()
                .zip(Tag::ALL)
                .filter(|(value, _)| value.is_none())
                .map(|(_, tag)| tag)
                .collect();
            debug!("MT799 parse failed, missing {} tag(s)", missing.len());
            Err(ParseError::MissingTags(missing))
        }
    }
}
