use serde::{Deserialize, Serialize};

/// Report window: a named `range`, or explicit `YYYY-MM-DD` bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RangeParams {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeParams {
    pub fn named(range: impl Into<String>) -> Self {
        Self {
            range: Some(range.into()),
            ..Self::default()
        }
    }
}
