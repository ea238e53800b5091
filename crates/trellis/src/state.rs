//! Node naming and per-node input state.
use std::{fmt, str::FromStr};

use convert_case::{Case, Casing};

use crate::{error, error::Result};

/// Return true if the character is valid in a node name.
pub fn valid_nodename_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

/// Return true if the full name is valid.
pub fn valid_nodename(name: &str) -> bool {
    !name.is_empty() && name.chars().all(valid_nodename_char)
}

/// A diagnostic node name: lowercase ASCII alphanumerics plus underscores.
///
/// Names appear in tree dumps, logs and test traces. They carry no routing
/// semantics and need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeName {
    /// Stored node name string.
    name: String,
}

impl NodeName {
    /// Create a new NodeName, returning an error if the string contains
    /// invalid characters.
    fn new(name: &str) -> Result<Self> {
        if !valid_nodename(name) {
            return Err(error::Error::Invalid(name.into()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Munge an arbitrary string into a valid node name.
    ///
    /// Path qualifiers and generic arguments are stripped first, so a full
    /// type name like `myapp::widgets::TextBox<Plain>` becomes `text_box`.
    /// The remainder is snake-cased and filtered down to valid characters,
    /// falling back to `node` if nothing survives.
    pub fn convert(name: &str) -> Self {
        let base = name.split('<').next().unwrap_or(name);
        let base = base.rsplit("::").next().unwrap_or(base);
        let raw = base.to_case(Case::Snake);
        let filtered: String = raw.chars().filter(|x| valid_nodename_char(*x)).collect();
        let name = if filtered.is_empty() {
            "node".to_string()
        } else {
            filtered
        };
        Self { name }
    }
}

impl FromStr for NodeName {
    type Err = error::Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl PartialEq<String> for NodeName {
    fn eq(&self, other: &String) -> bool {
        self.name == *other
    }
}

/// Converts a string into the standard node name format, and errors if it
/// doesn't comply.
impl TryFrom<&str> for NodeName {
    type Error = error::Error;
    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

/// Runtime mouse-interaction state of a node, managed by the router.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// Not under the cursor.
    #[default]
    Idle,
    /// Under the cursor.
    Hovered,
    /// Under the cursor with the primary button held.
    Pressed,
}
