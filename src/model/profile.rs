use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A participant's profile entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub nickname: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Profile {
    /// First non-empty of nickname, display name, then the same keys in `fields`.
    pub fn name(&self) -> Option<&str> {
        [
            self.nickname.as_deref(),
            self.display_name.as_deref(),
            self.fields.get("nickname").map(String::as_str),
            self.fields.get("display_name").map(String::as_str),
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
    }
}
