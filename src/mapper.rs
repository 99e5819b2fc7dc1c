//! Field-coercion mapper.
//!
//! Every resource model declares a static [`Schema`]: an ordered list of
//! `(name, kind)` pairs plus its primary keys. [`Record::from_raw`] runs one
//! coercion pass over a decoded JSON object and yields a value for every
//! declared field, and nothing else.
//!
//! Coercion is lossy by contract. A value that does not fit its declared
//! kind becomes [`FieldValue::Null`] instead of failing construction; the
//! only error is a payload that is not a JSON object at all.
//!
//! The policy differs per kind:
//!
//! | Kind | Key absent or `null` | Uncoercible value |
//! |---|---|---|
//! | [`FieldKind::Str`] | `"null"` placeholder | never happens |
//! | [`FieldKind::Int`], [`FieldKind::Float`] | left untouched | `Null` |
//! | [`FieldKind::Bool`] | left untouched | never happens (truthiness) |
//! | [`FieldKind::DateTime`] | `Null` | `Null` |
//! | [`FieldKind::Dict`], [`FieldKind::List`] | left untouched | `Null` |
//! | [`FieldKind::Object`], [`FieldKind::ObjectList`] | left untouched (also when empty) | `Null` |
//!
//! Slots start out as `Null`, so "left untouched" reads as `Null` after a
//! single pass.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use crate::client::XplentyClient;
use crate::error::{Result, XplentyError};

/// Text a string field takes when the payload has no value for it.
pub const NULL_PLACEHOLDER: &str = "null";

/// The declared target type of one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Str,
    Int,
    Float,
    Bool,
    DateTime,
    /// Opaque JSON object, copied as-is.
    Dict,
    /// Opaque JSON array, copied as-is.
    List,
    /// A single nested resource.
    Object(&'static Schema),
    /// An ordered list of nested resources.
    ObjectList(&'static Schema),
}

/// A named field and its coercion kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDecl {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// The static field layout of a resource model.
#[derive(Debug)]
pub struct Schema {
    /// Model name, used in error messages and display output.
    pub model: &'static str,
    /// Declared fields, in export order.
    pub fields: &'static [FieldDecl],
    /// Fields identifying an instance. The first one is its identity.
    pub primary_keys: &'static [&'static str],
}

impl Schema {
    /// Look up a field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of all declared fields, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A coerced field value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    /// No value: absent from the payload, or not coercible.
    #[default]
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Dict(Map<String, Value>),
    List(Vec<Value>),
    Object(Box<Record>),
    ObjectList(Vec<Record>),
}

impl FieldValue {
    /// Returns true if the field holds no value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String content, or the placeholder for anything else.
    pub fn into_str(self) -> String {
        match self {
            Self::Str(s) => s,
            _ => NULL_PLACEHOLDER.to_string(),
        }
    }

    pub fn into_int(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_float(self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_dict(self) -> Option<Map<String, Value>> {
        match self {
            Self::Dict(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Object(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Self::ObjectList(v) => Some(v),
            _ => None,
        }
    }

    /// Export as raw JSON. Nested records are flattened back into objects.
    pub fn to_raw(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Str(s) => Value::String(s.clone()),
            Self::Int(v) => Value::from(*v),
            Self::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
            Self::Bool(v) => Value::Bool(*v),
            Self::DateTime(v) => Value::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Dict(v) => Value::Object(v.clone()),
            Self::List(v) => Value::Array(v.clone()),
            Self::Object(record) => Value::Object(record.to_raw()),
            Self::ObjectList(records) => {
                Value::Array(records.iter().map(|r| Value::Object(r.to_raw())).collect())
            }
        }
    }
}

/// Opaque handle to the client a resource was fetched with.
///
/// Carried for convenience only: it never takes part in equality.
#[derive(Clone, Default)]
pub struct Context(Option<XplentyClient>);

impl Context {
    /// A context not attached to any client.
    pub fn detached() -> Self {
        Self(None)
    }

    pub fn client(&self) -> Option<&XplentyClient> {
        self.0.as_ref()
    }
}

impl From<Option<&XplentyClient>> for Context {
    fn from(client: Option<&XplentyClient>) -> Self {
        Self(client.cloned())
    }
}

impl PartialEq for Context {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(client) => f.debug_tuple("Context").field(client).finish(),
            None => f.write_str("Context(detached)"),
        }
    }
}

/// One resource instance as produced by the mapper: a value per declared
/// field, in schema order.
#[derive(Clone)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<FieldValue>,
    context: Context,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.schema.model);
        for (name, value) in self.fields() {
            out.field(name, value);
        }
        out.finish()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.model == other.schema.model && self.values == other.values
    }
}

impl Record {
    /// Build a record from a decoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`XplentyError::UnexpectedPayload`] if `raw` is not a JSON
    /// object. Malformed field values never fail.
    pub fn from_raw(schema: &'static Schema, raw: &Value, context: Context) -> Result<Self> {
        let fields = raw.as_object().ok_or(XplentyError::UnexpectedPayload {
            model: schema.model,
            expected: "a JSON object",
        })?;
        Ok(Self::from_map(schema, fields, context))
    }

    fn from_map(schema: &'static Schema, raw: &Map<String, Value>, context: Context) -> Self {
        let mut values = vec![FieldValue::Null; schema.fields.len()];
        for (slot, decl) in values.iter_mut().zip(schema.fields) {
            coerce_into(slot, decl.kind, raw.get(decl.name), &context);
        }
        Self {
            schema,
            values,
            context,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The value of a declared field, or `None` if the schema has no such
    /// field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    /// Move a field's value out, leaving `Null` behind.
    pub fn take(&mut self, name: &str) -> FieldValue {
        self.schema
            .position(name)
            .map(|i| std::mem::take(&mut self.values[i]))
            .unwrap_or_default()
    }

    /// Iterate over `(name, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.schema.names().zip(self.values.iter())
    }

    /// Value of the first primary key; `None` for models without one.
    pub fn identity(&self) -> Option<&FieldValue> {
        self.schema
            .primary_keys
            .first()
            .and_then(|pk| self.get(pk))
    }

    /// Export every declared field as a raw JSON object.
    ///
    /// Feeding the export back through [`Record::from_raw`] with the same
    /// schema gives an equal record. Nested records survive only because
    /// they are flattened here; the [`FieldValue::Object`] values returned by
    /// [`Record::get`] are not raw payloads themselves.
    pub fn to_raw(&self) -> Map<String, Value> {
        self.fields()
            .map(|(name, value)| (name.to_string(), value.to_raw()))
            .collect()
    }
}

fn coerce_into(slot: &mut FieldValue, kind: FieldKind, raw: Option<&Value>, context: &Context) {
    let present = raw.filter(|v| !v.is_null());

    match kind {
        FieldKind::Str => *slot = FieldValue::Str(coerce_str(present)),
        FieldKind::Int => {
            if let Some(value) = present {
                *slot = coerce_int(value).map_or(FieldValue::Null, FieldValue::Int);
            }
        }
        FieldKind::Float => {
            if let Some(value) = present {
                *slot = coerce_float(value).map_or(FieldValue::Null, FieldValue::Float);
            }
        }
        FieldKind::Bool => {
            if let Some(value) = present {
                *slot = FieldValue::Bool(is_truthy(value));
            }
        }
        FieldKind::DateTime => {
            *slot = present
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
                .map_or(FieldValue::Null, FieldValue::DateTime);
        }
        FieldKind::Dict => {
            if let Some(value) = present {
                *slot = value
                    .as_object()
                    .cloned()
                    .map_or(FieldValue::Null, FieldValue::Dict);
            }
        }
        FieldKind::List => {
            if let Some(value) = present {
                *slot = value
                    .as_array()
                    .cloned()
                    .map_or(FieldValue::Null, FieldValue::List);
            }
        }
        FieldKind::Object(nested) => {
            if let Some(value) = present.filter(|v| is_truthy(v)) {
                *slot = value.as_object().map_or(FieldValue::Null, |map| {
                    FieldValue::Object(Box::new(Record::from_map(nested, map, context.clone())))
                });
            }
        }
        FieldKind::ObjectList(nested) => {
            if let Some(value) = present.filter(|v| is_truthy(v)) {
                let records: Option<Vec<Record>> = value.as_array().and_then(|items| {
                    items
                        .iter()
                        .map(|item| {
                            item.as_object()
                                .map(|map| Record::from_map(nested, map, context.clone()))
                        })
                        .collect()
                });
                *slot = records.map_or(FieldValue::Null, FieldValue::ObjectList);
            }
        }
    }
}

fn coerce_str(raw: Option<&Value>) -> String {
    match raw {
        None => NULL_PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn coerce_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        // `f64::from_str` also accepts "inf" and "NaN", which JSON cannot carry back
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Parse an ISO-8601 style timestamp. Values without an offset are UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = text.strip_suffix('Z').unwrap_or(text);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
