use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The fixed set of categories a row may carry.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Entertainment,
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories, in the order the form presents them.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    /// Parses the raw value of a category input. The empty string means "no category".
    pub fn parse_optional(value: &str) -> crate::Result<Option<Category>> {
        if value.is_empty() {
            return Ok(None);
        }
        value.parse::<Category>().map(Some).map_err(|_| {
            anyhow::anyhow!(
                "Invalid category '{value}', expected one of: {}",
                Category::ALL.map(|c| c.to_string()).join(", ")
            )
        })
    }
}
