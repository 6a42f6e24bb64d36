use std::fmt;

use serde::{Deserialize, Serialize};

/// The three MT799 field tags this service recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Reference,
    RelatedReference,
    Narrative,
}

impl Tag {
    /// All recognised tags, in field order.
    pub const ALL: [Tag; 3] = [Tag::Reference, Tag::RelatedReference, Tag::Narrative];

    /// Four-character line prefix that opens the field.
    pub fn prefix(self) -> &'static str {
        match self {
            Tag::Reference => ":20:",
            Tag::RelatedReference => ":21:",
            Tag::Narrative => ":79:",
        }
    }

    /// Field name used in JSON payloads and the store's column names.
    pub fn field_name(self) -> &'static str {
        match self {
            Tag::Reference => "Reference",
            Tag::RelatedReference => "RelatedReference",
            Tag::Narrative => "Narrative",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.field_name(), self.prefix())
    }
}

/// A fully extracted MT799 message. Only ever built with all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedMessage {
    pub reference: String,
    pub related_reference: String,
    pub narrative: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_are_four_chars() {
        for tag in Tag::ALL {
            assert_eq!(tag.prefix().len(), 4);
            assert!(tag.prefix().starts_with(':') && tag.prefix().ends_with(':'));
        }
    }

    #[test]
    fn test_parsed_message_json_keys() {
        let msg = ParsedMessage {
            reference: "REF123".into(),
            related_reference: "RELREF456".into(),
            narrative: "Hello World".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["Reference"], "REF123");
        assert_eq!(json["RelatedReference"], "RELREF456");
        assert_eq!(json["Narrative"], "Hello World");
    }
}
