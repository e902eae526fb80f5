use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Server-defined taxpayer category code (e.g. `"U"`, `"J"`).
///
/// The client does not validate codes; an unknown code is sent as-is and
/// rejected by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilingStatus(String);

impl FilingStatus {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilingStatus {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Display labels for filing-status codes, as served by `get_status_names`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusNames(BTreeMap<String, String>);

impl StatusNames {
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self(names)
    }

    /// Label for `status`, falling back to the raw code when the server sent none.
    pub fn label_for(&self, status: &FilingStatus) -> String {
        self.0
            .get(status.code())
            .cloned()
            .unwrap_or_else(|| status.code().to_string())
    }

    pub fn codes(&self) -> impl Iterator<Item = FilingStatus> + '_ {
        self.0.keys().map(|code| FilingStatus::new(code.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
