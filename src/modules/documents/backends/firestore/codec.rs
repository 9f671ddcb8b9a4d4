// Firestore REST wire format
//
// Converts between plain JSON document bodies and Firestore's typed value
// encoding, and renders queries as `structuredQuery` payloads.
// Reference: https://firebase.google.com/docs/firestore/reference/rest/v1/Value

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

use crate::core::{timestamp, AppError, Result};
use crate::modules::documents::models::{
    Condition, Document, Fields, Operator, Query, SortDirection,
};

/// Document resource as returned by the REST API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub update_time: Option<String>,
}

impl FirestoreDocument {
    pub fn into_document(self) -> Result<Document> {
        Ok(Document::new(document_id(&self.name), decode_fields(&self.fields)?))
    }

    pub fn write_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.update_time
            .as_deref()
            .map(timestamp::parse_rfc3339)
            .transpose()
    }
}

/// One element of a `runQuery` response stream
#[derive(Debug, Deserialize)]
pub struct RunQueryRow {
    pub document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    #[serde(default)]
    pub write_results: Vec<WriteResult>,
    pub commit_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub update_time: Option<String>,
}

impl CommitResponse {
    /// Update time of the first write, falling back to the commit time
    pub fn write_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.write_results
            .first()
            .and_then(|w| w.update_time.as_deref())
            .or(self.commit_time.as_deref())
            .map(timestamp::parse_rfc3339)
            .transpose()
    }
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

/// Last path segment of a document resource name
pub fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

/// Encode a JSON value as a Firestore typed value.
/// Integers must fit in int64; larger unsigned values are rejected rather
/// than rounded through a double.
pub fn encode_value(value: &Value) -> Result<Value> {
    let encoded = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // int64 travels as a decimal string
                json!({ "integerValue": i.to_string() })
            } else if n.is_u64() {
                return Err(AppError::validation(format!(
                    "Integer {} does not fit in a signed 64-bit field",
                    n
                )));
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items.iter().map(encode_value).collect::<Result<Vec<_>>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map)? } }),
    };

    Ok(encoded)
}

pub fn encode_fields(fields: &Fields) -> Result<Value> {
    let encoded = fields
        .iter()
        .map(|(k, v)| -> Result<(String, Value)> { Ok((k.clone(), encode_value(v)?)) })
        .collect::<Result<Map<String, Value>>>()?;
    Ok(Value::Object(encoded))
}

/// Decode a Firestore typed value into plain JSON.
/// Timestamps, references and bytes come back as their string form.
pub fn decode_value(value: &Value) -> Result<Value> {
    let (kind, inner) = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| AppError::internal(format!("Malformed Firestore value: {}", value)))?;

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or_default()),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| AppError::internal(format!("Invalid integerValue: {}", inner)))?
        }
        // NaN and infinities have no JSON form
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Value::Array(values)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default();
            Value::Object(fields)
        }
        other => {
            return Err(AppError::internal(format!(
                "Unsupported Firestore value type: {}",
                other
            )))
        }
    };

    Ok(decoded)
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields> {
    fields
        .iter()
        .map(|(k, v)| -> Result<(String, Value)> { Ok((k.clone(), decode_value(v)?)) })
        .collect()
}

fn is_simple_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Join path segments into a field path, quoting segments that need it
pub fn encode_field_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| {
            let segment = segment.as_ref();
            if is_simple_segment(segment) {
                segment.to_string()
            } else {
                format!("`{}`", segment.replace('\\', "\\\\").replace('`', "\\`"))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Field path for a dotted name as used in conditions and ordering
pub fn dotted_field_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('.').collect();
    encode_field_path(segments.as_slice())
}

fn operator_name(operator: Operator) -> &'static str {
    match operator {
        Operator::LessThan => "LESS_THAN",
        Operator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        Operator::Equal => "EQUAL",
        Operator::GreaterThan => "GREATER_THAN",
        Operator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
    }
}

fn encode_condition(condition: &Condition) -> Result<Value> {
    let field = json!({ "fieldPath": dotted_field_path(&condition.field) });

    // Equality against null must be sent as a unary filter
    if condition.operator == Operator::Equal && condition.value.is_null() {
        return Ok(json!({ "unaryFilter": { "op": "IS_NULL", "field": field } }));
    }

    Ok(json!({
        "fieldFilter": {
            "field": field,
            "op": operator_name(condition.operator),
            "value": encode_value(&condition.value)?,
        }
    }))
}

/// Render a query as a `runQuery` request body
pub fn encode_structured_query(query: &Query) -> Result<Value> {
    let mut structured = Map::new();
    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": query.collection_name() }]),
    );

    match query.conditions() {
        [] => {}
        [single] => {
            structured.insert("where".to_string(), encode_condition(single)?);
        }
        many => {
            let filters = many.iter().map(encode_condition).collect::<Result<Vec<_>>>()?;
            structured.insert(
                "where".to_string(),
                json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
            );
        }
    }

    if !query.ordering().is_empty() {
        let orders: Vec<Value> = query
            .ordering()
            .iter()
            .map(|order| {
                let direction = match order.direction {
                    SortDirection::Ascending => "ASCENDING",
                    SortDirection::Descending => "DESCENDING",
                };
                json!({
                    "field": { "fieldPath": dotted_field_path(&order.field) },
                    "direction": direction,
                })
            })
            .collect();
        structured.insert("orderBy".to_string(), Value::Array(orders));
    }

    if let Some(limit) = query.max_results() {
        structured.insert("limit".to_string(), json!(limit));
    }

    Ok(json!({ "structuredQuery": structured }))
}
