#![forbid(unsafe_code)]

//! Storage item contract.

use std::cmp::Ordering;

/// A single field value exposed to filters and sorts.
///
/// Integers and floats compare numerically with each other; otherwise
/// values order by type (null, bool, number, text) and then by value, so
/// sorting a mixed column is total and deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Field {
    fn rank(&self) -> u8 {
        match self {
            Field::Null => 0,
            Field::Bool(_) => 1,
            Field::Int(_) | Field::Float(_) => 2,
            Field::Text(_) => 3,
        }
    }

    /// Total order over field values. Floats use `total_cmp`, so NaN has
    /// a stable position instead of poisoning a sort.
    #[must_use]
    pub fn compare(&self, other: &Field) -> Ordering {
        match (self, other) {
            (Field::Null, Field::Null) => Ordering::Equal,
            (Field::Bool(a), Field::Bool(b)) => a.cmp(b),
            (Field::Int(a), Field::Int(b)) => a.cmp(b),
            (Field::Float(a), Field::Float(b)) => a.total_cmp(b),
            (Field::Int(a), Field::Float(b)) => (*a as f64).total_cmp(b),
            (Field::Float(a), Field::Int(b)) => a.total_cmp(&(*b as f64)),
            (Field::Text(a), Field::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Int(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Float(value)
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Field::Bool(value)
    }
}

/// A document that can live in a storage table.
///
/// `id` is the stable primary key rows sort by; `name` is the label the
/// search box matches against. `field` exposes named columns to typed
/// filters and sorts. The default implementation maps `"id"` and
/// `"name"` and reads everything else as [`Field::Null`]; items with
/// more columns override it.
pub trait StorageItem: Clone + 'static {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn field(&self, column: &str) -> Field {
        match column {
            "id" => Field::Text(self.id().to_string()),
            "name" => Field::Text(self.name().to_string()),
            _ => Field::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Listeners;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        id: String,
        name: String,
    }

    impl StorageItem for Doc {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn default_field_maps_id_and_name() {
        let doc = Doc {
            id: "c1".into(),
            name: "print".into(),
        };
        assert_eq!(doc.field("id"), Field::Text("c1".into()));
        assert_eq!(doc.field("name"), Field::Text("print".into()));
        assert_eq!(doc.field("missing"), Field::Null);
    }

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(Field::Int(2).compare(&Field::Float(2.5)), Ordering::Less);
        assert_eq!(Field::Float(3.0).compare(&Field::Int(3)), Ordering::Equal);
        assert_eq!(Field::Int(4).compare(&Field::Float(3.5)), Ordering::Greater);
    }

    #[test]
    fn mixed_types_order_by_rank() {
        assert_eq!(Field::Null.compare(&Field::Bool(false)), Ordering::Less);
        assert_eq!(Field::Bool(true).compare(&Field::Int(0)), Ordering::Less);
        assert_eq!(Field::Int(999).compare(&Field::Text("a".into())), Ordering::Less);
    }

    #[test]
    fn nan_has_a_stable_position() {
        let nan = Field::Float(f64::NAN);
        assert_eq!(nan.compare(&nan), Ordering::Equal);
        assert_eq!(Field::Float(1.0).compare(&nan), Ordering::Less);
    }

    // The trait bound alone must be enough to hold items in a listener
    // registry; generic code over `StorageItem` cannot name a tighter
    // lifetime.
    #[test]
    fn items_can_back_a_listener_registry() {
        fn feed_for<T: StorageItem>() -> Listeners<T> {
            Listeners::new()
        }

        assert!(feed_for::<Doc>().is_empty());
    }
}
