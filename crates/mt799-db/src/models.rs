/// Database row type, mapped straight from the `SwiftMessages` table.
/// Kept apart from the API DTOs so the store layer has no wire concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwiftMessageRow {
    pub id: i64,
    pub reference: String,
    pub related_reference: String,
    pub narrative: String,
}
