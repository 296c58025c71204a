//! Recursive merge of YAML values

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

/// Merge `b` into `a`, returning a new value
///
/// - Two mappings merge key by key; keys of `a` keep their position and new
///   keys of `b` are appended in `b`'s order.
/// - Two sequences concatenate, duplicates kept.
/// - Two values carrying the same tag merge their contents, so tagged sets
///   (`!!set` mappings with null values) union.
/// - Anything else, including mismatched shapes, yields a copy of `b`.
#[must_use]
pub fn deep_merge(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Mapping(left), Value::Mapping(right)) => Value::Mapping(merge_mappings(left, right)),
        (Value::Sequence(left), Value::Sequence(right)) => {
            Value::Sequence(left.iter().chain(right).cloned().collect())
        }
        (Value::Tagged(left), Value::Tagged(right)) if left.tag == right.tag => {
            Value::Tagged(Box::new(TaggedValue {
                tag: left.tag.clone(),
                value: deep_merge(&left.value, &right.value),
            }))
        }
        _ => b.clone(),
    }
}

/// Merge two mappings key by key
#[must_use]
pub fn merge_mappings(left: &Mapping, right: &Mapping) -> Mapping {
    let mut result = left.clone();
    for (key, value) in right {
        let merged = match result.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        // Replacing an existing key keeps its position
        result.insert(key.clone(), merged);
    }
    result
}

/// Left-fold a list of documents through [`deep_merge`]
///
/// The fold is seeded by the first document, or an empty mapping when the
/// list is empty.
#[must_use]
pub fn merge_all<I>(documents: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut documents = documents.into_iter();
    let Some(first) = documents.next() else {
        return Value::Mapping(Mapping::new());
    };
    documents.fold(first, |acc, next| deep_merge(&acc, &next))
}
