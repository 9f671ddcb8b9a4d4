// Query model
//
// Conditions, ordering and the immutable query value handed to a backend.
// Each builder step consumes the query and returns the extended one, so a
// query under construction is never shared between calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{AppError, Result};

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    LessThan,

    #[serde(rename = "<=")]
    LessThanOrEqual,

    #[serde(rename = "==")]
    Equal,

    #[serde(rename = ">")]
    GreaterThan,

    #[serde(rename = ">=")]
    GreaterThanOrEqual,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::Equal => "==",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    /// Range operators constrain ordering on the store side
    pub fn is_inequality(&self) -> bool {
        !matches!(self, Operator::Equal)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            "==" => Ok(Operator::Equal),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            _ => Err(format!("Invalid operator: {}", s)),
        }
    }
}

/// A single filter predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Field name or dotted path
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Equal, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThan, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThanOrEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThan, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThanOrEqual, value)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Sort direction, ascending unless stated otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,

    #[serde(rename = "desc")]
    Descending,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Query over a single collection
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    conditions: Vec<Condition>,
    order_by: Vec<OrderBy>,
    limit: Option<u32>,
}

impl Query {
    /// Start from every document in `collection`
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// AND another condition onto the query
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filters<I>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Condition>,
    {
        conditions.into_iter().fold(self, Query::filter)
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn order_by_all<I>(self, orders: I) -> Self
    where
        I: IntoIterator<Item = OrderBy>,
    {
        orders.into_iter().fold(self, Query::order_by)
    }

    /// Cap the number of results; zero removes the cap
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn max_results(&self) -> Option<u32> {
        self.limit
    }

    /// Reject queries the store could never run
    pub fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() {
            return Err(AppError::validation("Query collection cannot be empty"));
        }

        if let Some(condition) = self.conditions.iter().find(|c| c.field.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "Condition field cannot be empty (operator {})",
                condition.operator
            )));
        }

        // Range comparisons against null never match in the store
        if let Some(condition) = self
            .conditions
            .iter()
            .find(|c| c.operator.is_inequality() && c.value.is_null())
        {
            return Err(AppError::validation(format!(
                "Operator {} cannot compare field '{}' against null",
                condition.operator, condition.field
            )));
        }

        if self.order_by.iter().any(|o| o.field.trim().is_empty()) {
            return Err(AppError::validation("Order by field cannot be empty"));
        }

        Ok(())
    }
}
