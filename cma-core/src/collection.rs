//! Paginated collection envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cursor links of a cursor-paginated collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// Pagination metadata, in whichever shape the response used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pagination {
    Offset {
        total: u64,
        skip: u64,
        limit: u64,
    },
    Cursor {
        pages: CursorPages,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u64>,
    },
}

/// A list response: items plus everything else the envelope carried.
///
/// Fields other than `items` (`total`, `skip`, `limit`, `pages`, `includes`,
/// ...) are kept verbatim in `rest` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<T> {
    /// Envelope metadata (`{"type": "Array"}`), passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Value>,
    pub items: Vec<T>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl<T> Collection<T> {
    /// Transforms every item. Cardinality and every other field are preserved.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Collection<U> {
        Collection {
            sys: self.sys,
            items: self.items.into_iter().map(f).collect(),
            rest: self.rest,
        }
    }

    /// Pagination read from the envelope. `None` when neither `pages` nor a
    /// full `total`/`skip`/`limit` triple is present.
    pub fn pagination(&self) -> Option<Pagination> {
        let number = |name: &str| self.rest.get(name).and_then(Value::as_u64);
        if let Some(pages) = self.rest.get("pages") {
            return Some(Pagination::Cursor {
                pages: serde_json::from_value(pages.clone()).ok()?,
                limit: number("limit"),
            });
        }
        Some(Pagination::Offset {
            total: number("total")?,
            skip: number("skip")?,
            limit: number("limit")?,
        })
    }

    /// Linked entities sideloaded with the items, if any.
    pub fn includes(&self) -> Option<&Value> {
        self.rest.get("includes")
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Collection<Value> {
    /// Parses a raw list response body.
    pub fn from_value(value: Value) -> crate::CmaResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Lifts an item wrapper to operate over a whole envelope.
pub fn wrap_collection<T, U, F>(wrap_item: F) -> impl Fn(Collection<T>) -> Collection<U>
where
    F: Fn(T) -> U,
{
    move |collection| collection.map(&wrap_item)
}
