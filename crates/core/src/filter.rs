//! Generic filter expressions.
//!
//! A filter maps a column name to either a scalar (equality) or an operator
//! object. Two operator shapes are understood:
//!
//! ```json
//! { "age": { "gt": 18 } }
//! { "age": { "op": "gt", "value": 18 } }
//! ```
//!
//! Anything else, including an object with an unknown operator key, is
//! matched for equality against the literal object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Comparison operators a relational backend must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    Ilike,
}

impl FilterOp {
    /// Precedence used when an operator object carries several keys.
    pub const ALL: [FilterOp; 8] = [
        FilterOp::Eq,
        FilterOp::Neq,
        FilterOp::Gt,
        FilterOp::Lt,
        FilterOp::Gte,
        FilterOp::Lte,
        FilterOp::Like,
        FilterOp::Ilike,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Lt => "lt",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::Ilike => "ilike",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single backend-neutral predicate: `column <op> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }
}

/// Column → condition mapping as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterExpression(Map<String, Value>);

impl FilterExpression {
    pub fn new(conditions: Map<String, Value>) -> Self {
        Self(conditions)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Translate every column condition into a predicate, in column order.
    pub fn predicates(&self) -> Vec<Predicate> {
        self.0
            .iter()
            .map(|(column, condition)| translate(column, condition))
            .collect()
    }
}

impl From<Map<String, Value>> for FilterExpression {
    fn from(conditions: Map<String, Value>) -> Self {
        Self(conditions)
    }
}

fn translate(column: &str, condition: &Value) -> Predicate {
    let Value::Object(object) = condition else {
        return Predicate::new(column, FilterOp::Eq, condition.clone());
    };

    // Tagged form: {"op": "gt", "value": 18}
    if let (Some(Value::String(op)), Some(value)) = (object.get("op"), object.get("value")) {
        if let Some(op) = FilterOp::parse(op) {
            return Predicate::new(column, op, value.clone());
        }
    }

    // Keyed form: {"gt": 18}
    for op in FilterOp::ALL {
        if let Some(value) = object.get(op.as_str()) {
            return Predicate::new(column, op, value.clone());
        }
    }

    // Unknown operator: equality against the literal object.
    Predicate::new(column, FilterOp::Eq, condition.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(value: Value) -> FilterExpression {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn keyed_operator_translates() {
        let predicates = filter(json!({"age": {"gt": 18}})).predicates();
        assert_eq!(predicates, vec![Predicate::new("age", FilterOp::Gt, json!(18))]);
    }

    #[test]
    fn tagged_operator_translates() {
        let predicates = filter(json!({"name": {"op": "ilike", "value": "%ann%"}})).predicates();
        assert_eq!(
            predicates,
            vec![Predicate::new("name", FilterOp::Ilike, json!("%ann%"))]
        );
    }

    #[test]
    fn scalar_means_equality() {
        let predicates = filter(json!({"id": 7, "active": true})).predicates();
        assert_eq!(predicates.len(), 2);
        assert!(predicates.iter().all(|p| p.op == FilterOp::Eq));
        assert!(predicates.contains(&Predicate::new("id", FilterOp::Eq, json!(7))));
    }

    #[test]
    fn unknown_operator_falls_back_to_literal_equality() {
        let predicates = filter(json!({"age": {"between": [1, 5]}})).predicates();
        assert_eq!(
            predicates,
            vec![Predicate::new("age", FilterOp::Eq, json!({"between": [1, 5]}))]
        );

        let predicates = filter(json!({"age": {"op": "between", "value": 3}})).predicates();
        assert_eq!(predicates[0].op, FilterOp::Eq);
        assert_eq!(predicates[0].value, json!({"op": "between", "value": 3}));
    }

    #[test]
    fn precedence_picks_first_known_operator() {
        let predicates = filter(json!({"score": {"lte": 10, "gt": 1}})).predicates();
        assert_eq!(predicates[0].op, FilterOp::Gt);
        assert_eq!(predicates[0].value, json!(1));
    }

    #[test]
    fn op_round_trips_through_str() {
        for op in FilterOp::ALL {
            assert_eq!(FilterOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(FilterOp::parse("between"), None);
    }
}
