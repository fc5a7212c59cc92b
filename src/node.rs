use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::errors::ClosureGraphError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(Arc<str>);

impl Node {
    pub fn new<T: AsRef<str>>(value: T) -> Self {
        Node(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::new(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node(Arc::from(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: Option<Node>,
    pub predicate: Option<Node>,
    pub object: Option<Node>,
}

impl TriplePattern {
    pub fn new(subject: Option<Node>, predicate: Option<Node>, object: Option<Node>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, triple: &Triple) -> bool {
        fn slot(pattern: &Option<Node>, value: &Node) -> bool {
            pattern.as_ref().is_none_or(|p| p == value)
        }
        slot(&self.subject, &triple.subject)
            && slot(&self.predicate, &triple.predicate)
            && slot(&self.object, &triple.object)
    }
}

pub(crate) fn validate_node(node: &Node, role: &str) -> Result<(), ClosureGraphError> {
    if node.is_blank() {
        return Err(ClosureGraphError::invalid_argument(format!(
            "{role} node must be set"
        )));
    }
    Ok(())
}

pub(crate) fn validate_pattern(pattern: &TriplePattern) -> Result<(), ClosureGraphError> {
    if let Some(subject) = &pattern.subject {
        validate_node(subject, "subject")?;
    }
    if let Some(predicate) = &pattern.predicate {
        validate_node(predicate, "predicate")?;
    }
    if let Some(object) = &pattern.object {
        validate_node(object, "object")?;
    }
    Ok(())
}
