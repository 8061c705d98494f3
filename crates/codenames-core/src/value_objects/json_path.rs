//! Restricted JSONPath used to address parts of a state document
//!
//! Supported grammar is the subset the state store needs:
//!
//! ```text
//! $                              the whole document
//! $.teams.red.players            dotted member access
//! $.spectators[?(@.id=="...")]   equality filter over an array's elements
//! ```
//!
//! The same path renders to RedisJSON syntax (via `Display`) and can be
//! evaluated in-process against a `serde_json::Value`.

use serde_json::Value;
use std::fmt;

/// Equality filter applied to the elements of the array a path points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

/// A path into a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<String>,
    filter: Option<Filter>,
}

impl JsonPath {
    /// The document root (`$`)
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from a dotted member chain, e.g. `teams.red.players`
    #[must_use]
    pub fn at(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            filter: None,
        }
    }

    /// Append a member segment
    #[must_use]
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Restrict the path to array elements whose `field` equals `value`
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filter = Some(Filter {
            field: field.into(),
            value: value.to_string(),
        });
        self
    }

    /// Member segments from the root
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The trailing filter, if any
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty() && self.filter.is_none()
    }

    fn resolve<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(doc, |node, segment| node.get(segment.as_str()))
    }

    fn resolve_mut<'a>(&self, doc: &'a mut Value) -> Option<&'a mut Value> {
        self.segments
            .iter()
            .try_fold(doc, |node, segment| node.get_mut(segment.as_str()))
    }

    fn matches(filter: &Filter, element: &Value) -> bool {
        element.get(filter.field.as_str()).and_then(Value::as_str) == Some(filter.value.as_str())
    }

    /// Collect every value the path selects; an unresolved path selects nothing
    pub fn select<'a>(&self, doc: &'a Value) -> Vec<&'a Value> {
        let Some(node) = self.resolve(doc) else {
            return Vec::new();
        };

        match &self.filter {
            None => vec![node],
            Some(filter) => node
                .as_array()
                .map(|items| items.iter().filter(|e| Self::matches(filter, e)).collect())
                .unwrap_or_default(),
        }
    }

    /// Push `value` onto the array the path points at.
    ///
    /// Returns `false` if the path does not resolve to an array. Filtered
    /// paths never resolve to an append target.
    pub fn append(&self, doc: &mut Value, value: Value) -> bool {
        if self.filter.is_some() {
            return false;
        }
        match self.resolve_mut(doc).and_then(Value::as_array_mut) {
            Some(items) => {
                items.push(value);
                true
            }
            None => false,
        }
    }

    /// Remove every value the path selects, returning how many were removed
    pub fn delete(&self, doc: &mut Value) -> usize {
        if let Some(filter) = &self.filter {
            let Some(items) = self.resolve_mut(doc).and_then(Value::as_array_mut) else {
                return 0;
            };
            let before = items.len();
            items.retain(|e| !Self::matches(filter, e));
            return before - items.len();
        }

        let Some((last, parents)) = self.segments.split_last() else {
            return 0;
        };
        let parent = parents
            .iter()
            .try_fold(doc, |node, segment| node.get_mut(segment.as_str()));
        match parent.and_then(Value::as_object_mut) {
            Some(object) => usize::from(object.remove(last.as_str()).is_some()),
            None => 0,
        }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        if let Some(filter) = &self.filter {
            let literal = Value::String(filter.value.clone());
            write!(f, "[?(@.{}=={literal})]", filter.field)?;
        }
        Ok(())
    }
}
