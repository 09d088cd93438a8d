//! Collection queries: field filters, a single ordering, cursor and limit.
//!
//! Semantics follow the usual document-database rules: a document missing a
//! filtered or ordered field never matches, and values of different JSON
//! types never compare equal or ordered against each other in a filter.

use serde_json::Value;
use std::cmp::Ordering;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// A single `field <op> value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    fn matches(&self, doc: &Value) -> bool {
        let Some(actual) = doc.get(&self.field) else {
            return false;
        };
        let Some(ordering) = compare_same_type(actual, &self.value) else {
            return false;
        };
        match self.op {
            Op::Eq => ordering == Ordering::Equal,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
        }
    }
}

/// Query over the direct children of a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order_by: Option<(String, Direction)>,
    limit: Option<usize>,
    start_after: Option<String>,
}

impl Query {
    /// An unfiltered query returning every document ordered by id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a filter.
    pub fn filter(mut self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    /// Builder: `field == value`.
    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, Op::Eq, value)
    }

    /// Builder: `field <= value`.
    pub fn where_lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, Op::Lte, value)
    }

    /// Builder: order by a field. Ties are broken by document id.
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    /// Builder: cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder: resume after the document with this id.
    ///
    /// The cursor is positioned by the cursor document's own sort value, so
    /// it works even when that document no longer matches the filters. An
    /// id that does not exist in the collection is ignored.
    pub fn start_after(mut self, id: impl Into<String>) -> Self {
        self.start_after = Some(id.into());
        self
    }

    /// Run the query over `(id, document)` pairs of one collection.
    pub(crate) fn execute(&self, docs: Vec<(String, Value)>) -> Vec<(String, Value)> {
        let cursor = self
            .start_after
            .as_ref()
            .and_then(|id| docs.iter().find(|(doc_id, _)| doc_id == id).cloned());

        let mut results: Vec<(String, Value)> = docs
            .into_iter()
            .filter(|(_, doc)| self.filters.iter().all(|f| f.matches(doc)))
            .filter(|(_, doc)| match &self.order_by {
                Some((field, _)) => doc.get(field).is_some(),
                None => true,
            })
            .collect();

        results.sort_by(|a, b| self.compare(a, b));

        if let Some(cursor) = cursor {
            results.retain(|doc| self.compare(doc, &cursor) == Ordering::Greater);
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }

    fn compare(&self, a: &(String, Value), b: &(String, Value)) -> Ordering {
        let by_field = match &self.order_by {
            Some((field, direction)) => {
                let ordering = total_order(
                    a.1.get(field).unwrap_or(&Value::Null),
                    b.1.get(field).unwrap_or(&Value::Null),
                );
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            }
            None => Ordering::Equal,
        };
        by_field.then_with(|| a.0.cmp(&b.0))
    }
}

fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn total_order(a: &Value, b: &Value) -> Ordering {
    compare_same_type(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs() -> Vec<(String, Value)> {
        vec![
            ("a".into(), json!({"n": 3, "pinned": true})),
            ("b".into(), json!({"n": 1, "pinned": false})),
            ("c".into(), json!({"n": 2, "pinned": true})),
            ("d".into(), json!({"pinned": true})),
        ]
    }

    fn ids(results: Vec<(String, Value)>) -> Vec<String> {
        results.into_iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn no_ordering_sorts_by_id() {
        assert_eq!(ids(Query::new().execute(docs())), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn order_excludes_documents_missing_the_field() {
        let q = Query::new().order_by("n", Direction::Descending);
        assert_eq!(ids(q.execute(docs())), vec!["a", "c", "b"]);
    }

    #[test]
    fn equality_filter() {
        let q = Query::new()
            .where_eq("pinned", true)
            .order_by("n", Direction::Ascending);
        assert_eq!(ids(q.execute(docs())), vec!["c", "a"]);
    }

    #[test]
    fn range_filter_skips_missing_and_mismatched_types() {
        let mut all = docs();
        all.push(("e".into(), json!({"n": "2"})));
        all.push(("f".into(), json!({"n": null})));
        let q = Query::new().where_lte("n", 2);
        assert_eq!(ids(q.execute(all)), vec!["b", "c"]);
    }

    #[test]
    fn cursor_and_limit() {
        let q = Query::new()
            .order_by("n", Direction::Descending)
            .start_after("a")
            .limit(1);
        assert_eq!(ids(q.execute(docs())), vec!["c"]);
    }

    #[test]
    fn cursor_outside_filter_still_positions() {
        // "b" is unpinned but still anchors the cursor by its n value
        let q = Query::new()
            .where_eq("pinned", true)
            .order_by("n", Direction::Ascending)
            .start_after("b");
        assert_eq!(ids(q.execute(docs())), vec!["c", "a"]);
    }

    #[test]
    fn unknown_cursor_is_ignored() {
        let q = Query::new()
            .order_by("n", Direction::Ascending)
            .start_after("zzz");
        assert_eq!(ids(q.execute(docs())), vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_break_by_id() {
        let docs = vec![
            ("y".into(), json!({"n": 1})),
            ("x".into(), json!({"n": 1})),
        ];
        let q = Query::new().order_by("n", Direction::Descending);
        assert_eq!(ids(q.execute(docs)), vec!["x", "y"]);
    }
}
