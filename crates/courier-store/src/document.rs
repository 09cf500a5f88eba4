use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding a document's primary id.
pub const ID_FIELD: &str = "_id";

/// The stored shape of an entity: an ordered, field-named JSON object.
pub type Document = Map<String, Value>;

/// A partial document selecting stored documents.
///
/// A document matches when, for every filter field, the document holds an
/// equal value or an array containing that value. The empty filter matches
/// every document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Document);

impl Filter {
    /// The empty filter.
    pub fn new() -> Self {
        Self(Document::new())
    }

    /// Append an equality condition. Later conditions on the same field
    /// replace earlier ones.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Conditions in the order they were added.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.0.iter().all(|(field, want)| match doc.get(field) {
            Some(Value::Array(items)) if !want.is_array() => items.contains(want),
            Some(have) => have == want,
            None => false,
        })
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

/// `field=value` pairs joined by commas, strings unquoted.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match value {
                Value::String(s) => write!(f, "{field}={s}")?,
                other => write!(f, "{field}={other}")?,
            }
        }
        Ok(())
    }
}

impl From<Document> for Filter {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

/// A "replace the named fields" update instruction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSpec {
    #[serde(rename = "$set")]
    pub set: Document,
}

impl UpdateSpec {
    pub fn set(fields: Document) -> Self {
        Self { set: fields }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Apply to a stored document in place. `_id` is never rewritten.
    pub fn apply(&self, doc: &mut Document) {
        for (field, value) in &self.set {
            if field == ID_FIELD {
                continue;
            }
            doc.insert(field.clone(), value.clone());
        }
    }
}
