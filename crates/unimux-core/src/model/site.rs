// ── Site domain type ──

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Integration UUID, classic `_id`, or the short name as a last resort.
    pub id: String,
    /// Short name (e.g. `default`) on classic controllers, display name otherwise.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Site {
    /// Matches a caller-supplied site string against `name` or `id`.
    pub fn matches(&self, requested: &str) -> bool {
        self.name == requested || self.id == requested
    }
}
