//! Shell output records

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The result of executing one shell command
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Output {
    Put {
        key: String,
        #[serde(rename = "type")]
        value_type: String,
        version: u64,
    },
    Get {
        key: String,
        found: bool,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        value_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    Remove {
        key: String,
        removed: bool,
        version: u64,
    },
    List {
        prefix: String,
        count: usize,
        entries: Vec<Entry>,
    },
    Len {
        len: usize,
    },
    Version {
        version: u64,
    },
}

/// A record as the CLI prints it: a `"status"` field in front of the body
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record<T> {
    pub status: &'static str,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Record<T> {
    pub fn ok(body: T) -> Self {
        Record { status: "ok", body }
    }
}

impl<T: fmt::Display> fmt::Display for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.body, f)
    }
}

/// One entry of a `list` result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entry {
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: String,
    /// `None` for values of types the shell does not render
    pub value: Option<Value>,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{:?} = {} ({})", self.key, value, self.value_type),
            None => write!(f, "{:?} ({})", self.key, self.value_type),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Put {
                key,
                value_type,
                version,
            } => write!(f, "put {:?} ({}) at version {}", key, value_type, version),
            Output::Get {
                key,
                value: Some(value),
                value_type,
                ..
            } => write!(
                f,
                "{:?} = {} ({})",
                key,
                value,
                value_type.as_deref().unwrap_or("?")
            ),
            Output::Get { key, .. } => write!(f, "{:?}: not found", key),
            Output::Remove {
                key,
                removed: true,
                version,
            } => write!(f, "removed {:?} at version {}", key, version),
            Output::Remove { key, .. } => write!(f, "{:?}: not present", key),
            Output::List { entries, .. } if entries.is_empty() => write!(f, "(no entries)"),
            Output::List { entries, .. } => {
                let lines: Vec<String> = entries.iter().map(Entry::to_string).collect();
                write!(f, "{}", lines.join("\n"))
            }
            Output::Len { len } => write!(f, "{}", len),
            Output::Version { version } => write!(f, "version {}", version),
        }
    }
}
