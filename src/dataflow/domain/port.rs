//! Port naming value objects.

use super::DataflowError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Validated port name.
///
/// Port names are trimmed and must not contain whitespace. They are compared
/// exactly; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortName(String);

impl PortName {
    /// Creates a validated port name.
    ///
    /// # Errors
    ///
    /// Returns [`DataflowError::InvalidPortName`] when the value is empty
    /// after trimming or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, DataflowError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.contains(char::is_whitespace) {
            return Err(DataflowError::InvalidPortName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the port name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PortName {
    type Error = DataflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PortName {
    type Error = DataflowError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PortName> for String {
    fn from(value: PortName) -> Self {
        value.0
    }
}

impl AsRef<str> for PortName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for PortName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `(source port, sink port)` key within one connection edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortPair {
    /// Output port on the source task.
    pub source: PortName,
    /// Input port on the sink task.
    pub sink: PortName,
}

impl PortPair {
    /// Creates a port pair.
    #[must_use]
    pub const fn new(source: PortName, sink: PortName) -> Self {
        Self { source, sink }
    }

    /// Parses both port names.
    ///
    /// # Errors
    ///
    /// Returns [`DataflowError::InvalidPortName`] when either name is
    /// invalid.
    pub fn parse(source: &str, sink: &str) -> Result<Self, DataflowError> {
        Ok(Self::new(PortName::new(source)?, PortName::new(sink)?))
    }
}

impl fmt::Display for PortPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.sink)
    }
}

/// One port on one graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortEndpoint<N> {
    /// Node owning the port.
    pub task: N,
    /// Port name on that node.
    pub port: PortName,
}

impl<N> PortEndpoint<N> {
    /// Creates an endpoint.
    #[must_use]
    pub const fn new(task: N, port: PortName) -> Self {
        Self { task, port }
    }
}

impl<N: fmt::Display> fmt::Display for PortEndpoint<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.task, self.port)
    }
}
