//! Generic stored-procedure dispatcher.
//!
//! A call names a registered database function and supplies its arguments
//! as a loose bag of JSON values gathered from a request body and headers.
//! The dispatcher resolves the function, coerces each declared parameter to
//! its SQL type, runs `SELECT * FROM name(param => $n, ...)` and returns the
//! rows as JSON maps keyed by column label.
//!
//! The outcome is always a JSON document: `{"result": [...]}` on success or
//! `{"error": "..."}` with `procedure_error` set on failure.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};

/// Header that carries the procedure name. Never forwarded as a parameter.
pub const PROCEDURE_NAME_HEADER: &str = "procedureName";

/// Key under which a non-object body is passed through.
pub const RAW_BODY_KEY: &str = "body";

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    BigInt,
    Text,
}

impl ParamType {
    fn describe(self) -> &'static str {
        match self {
            ParamType::BigInt => "an integer",
            ParamType::Text => "a string",
        }
    }
}

/// Signature of a callable result-set function.
#[derive(Debug, Clone, Copy)]
pub struct ProcedureSpec {
    pub name: &'static str,
    pub params: &'static [(&'static str, ParamType)],
}

/// Functions created by the `create_report_functions` migration.
pub const REGISTERED_PROCEDURES: &[ProcedureSpec] = &[
    ProcedureSpec {
        name: "get_member_donation_summary",
        params: &[("member_id", ParamType::BigInt)],
    },
    ProcedureSpec {
        name: "get_top_donors",
        params: &[("limit_count", ParamType::BigInt)],
    },
    ProcedureSpec {
        name: "search_members",
        params: &[("term", ParamType::Text)],
    },
];

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    #[error("Missing procedureName header")]
    MissingName,

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("Missing parameter '{param}' for procedure {procedure}")]
    MissingParameter {
        procedure: &'static str,
        param: &'static str,
    },

    #[error("Parameter '{param}' must be {expected}")]
    InvalidParameter {
        param: &'static str,
        expected: &'static str,
    },

    #[error("Unsupported column type {type_name} for column {column}")]
    UnsupportedColumn { column: String, type_name: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result document of a dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureOutcome {
    pub body: Value,
    pub procedure_error: bool,
}

impl ProcedureOutcome {
    pub fn success(rows: Vec<Map<String, Value>>) -> Self {
        ProcedureOutcome {
            body: json!({ "result": rows }),
            procedure_error: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ProcedureOutcome {
            body: json!({ "error": message.into() }),
            procedure_error: true,
        }
    }
}

/// One dispatch request: the procedure name, request headers and body.
#[derive(Debug, Clone, Default)]
pub struct ProcedureCall {
    pub procedure_name: Option<String>,
    pub headers: Map<String, Value>,
    pub body: Value,
}

// ---------------------------------------------------------------------------
// Parameter assembly
// ---------------------------------------------------------------------------

/// Merge body and headers into one parameter map.
///
/// An object body contributes its fields. A string body that starts with
/// `{` is parsed as an object; if parsing fails the raw string is kept under
/// [`RAW_BODY_KEY`]. Any other non-null body also goes under that key.
/// Headers are added afterwards without overwriting body keys, and the
/// procedure-name header is skipped.
pub fn build_parameters(body: &Value, headers: &Map<String, Value>) -> Map<String, Value> {
    let mut params = Map::new();

    match body {
        Value::Object(fields) => params.extend(fields.clone()),
        Value::String(raw) if raw.trim_start().starts_with('{') => {
            match serde_json::from_str::<Map<String, Value>>(raw) {
                Ok(fields) => params.extend(fields),
                Err(_) => {
                    params.insert(RAW_BODY_KEY.to_string(), body.clone());
                }
            }
        }
        Value::Null => {}
        other => {
            params.insert(RAW_BODY_KEY.to_string(), other.clone());
        }
    }

    for (key, value) in headers {
        if key == PROCEDURE_NAME_HEADER || params.contains_key(key) {
            continue;
        }
        params.insert(key.clone(), value.clone());
    }

    params
}

/// Check that `name` is a plain SQL identifier.
pub fn validate_identifier(name: &str) -> Result<(), ProcedureError> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(ProcedureError::InvalidIdentifier(name.to_string()))
    }
}

/// `GetTopDonors` -> `get_top_donors`. Already snake-cased names pass through.
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Find the registered procedure for a validated name. Accepts either the
/// SQL name or its CamelCase form.
pub fn resolve_procedure(name: &str) -> Result<&'static ProcedureSpec, ProcedureError> {
    validate_identifier(name)?;
    let snake = to_snake_case(name);
    REGISTERED_PROCEDURES
        .iter()
        .find(|spec| spec.name == snake)
        .ok_or_else(|| ProcedureError::UnknownProcedure(name.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
enum BoundValue {
    BigInt(i64),
    Text(String),
}

fn coerce(param: &'static str, kind: ParamType, value: &Value) -> Result<BoundValue, ProcedureError> {
    let invalid = || ProcedureError::InvalidParameter {
        param,
        expected: kind.describe(),
    };
    match kind {
        ParamType::BigInt => match value {
            Value::Number(n) => n.as_i64().map(BoundValue::BigInt).ok_or_else(invalid),
            Value::String(s) => s.trim().parse().map(BoundValue::BigInt).map_err(|_| invalid()),
            _ => Err(invalid()),
        },
        ParamType::Text => match value {
            Value::String(s) => Ok(BoundValue::Text(s.clone())),
            Value::Number(n) => Ok(BoundValue::Text(n.to_string())),
            Value::Bool(b) => Ok(BoundValue::Text(b.to_string())),
            _ => Err(invalid()),
        },
    }
}

/// Pick and coerce the declared parameters of `spec` out of `params`.
/// Undeclared entries are ignored.
fn bind_arguments(
    spec: &'static ProcedureSpec,
    params: &Map<String, Value>,
) -> Result<Vec<BoundValue>, ProcedureError> {
    spec.params
        .iter()
        .map(|&(name, kind)| {
            let value = params
                .get(name)
                .or_else(|| {
                    params
                        .iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(name))
                        .map(|(_, v)| v)
                })
                .filter(|v| !v.is_null())
                .ok_or(ProcedureError::MissingParameter {
                    procedure: spec.name,
                    param: name,
                })?;
            coerce(name, kind, value)
        })
        .collect()
}

fn call_sql(spec: &ProcedureSpec) -> String {
    let args: Vec<String> = spec
        .params
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("{name} => ${}", i + 1))
        .collect();
    format!("SELECT * FROM {}({})", spec.name, args.join(", "))
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

fn column_value(row: &PgRow, index: usize) -> Result<Value, ProcedureError> {
    let column = row.column(index);
    let type_name = column.type_info().name();

    fn to_json<T, F>(v: Option<T>, f: F) -> Value
    where
        F: FnOnce(T) -> Value,
    {
        v.map(f).unwrap_or(Value::Null)
    }

    let value = match type_name {
        "BOOL" => to_json(row.try_get::<Option<bool>, _>(index)?, Value::from),
        "INT2" => to_json(row.try_get::<Option<i16>, _>(index)?, Value::from),
        "INT4" => to_json(row.try_get::<Option<i32>, _>(index)?, Value::from),
        "INT8" => to_json(row.try_get::<Option<i64>, _>(index)?, Value::from),
        "FLOAT4" => to_json(row.try_get::<Option<f32>, _>(index)?, Value::from),
        "FLOAT8" => to_json(row.try_get::<Option<f64>, _>(index)?, Value::from),
        "NUMERIC" => to_json(row.try_get::<Option<Decimal>, _>(index)?, |d| {
            Value::String(d.to_string())
        }),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            to_json(row.try_get::<Option<String>, _>(index)?, Value::String)
        }
        "TIMESTAMPTZ" => to_json(row.try_get::<Option<DateTime<Utc>>, _>(index)?, |t| {
            Value::String(t.to_rfc3339())
        }),
        "TIMESTAMP" => to_json(row.try_get::<Option<NaiveDateTime>, _>(index)?, |t| {
            Value::String(t.to_string())
        }),
        "DATE" => to_json(row.try_get::<Option<NaiveDate>, _>(index)?, |d| {
            Value::String(d.to_string())
        }),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?.unwrap_or(Value::Null),
        other => {
            return Err(ProcedureError::UnsupportedColumn {
                column: column.name().to_string(),
                type_name: other.to_string(),
            })
        }
    };
    Ok(value)
}

/// Convert a result row into a JSON map keyed by column label.
pub fn row_to_map(row: &PgRow) -> Result<Map<String, Value>, ProcedureError> {
    let mut map = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), column_value(row, index)?);
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Runs registered result-set functions by name.
#[derive(Clone)]
pub struct DatabaseService {
    pool: PgPool,
}

impl DatabaseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run a registered function with already-assembled parameters.
    pub async fn execute(
        &self,
        procedure_name: &str,
        params: &Map<String, Value>,
    ) -> Result<Vec<Map<String, Value>>, ProcedureError> {
        let spec = resolve_procedure(procedure_name)?;
        let args = bind_arguments(spec, params)?;
        let sql = call_sql(spec);

        tracing::debug!(procedure = spec.name, params = ?params, "Calling procedure");

        let mut query = sqlx::query(&sql);
        for arg in &args {
            query = match arg {
                BoundValue::BigInt(v) => query.bind(*v),
                BoundValue::Text(v) => query.bind(v.as_str()),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_map).collect()
    }

    /// Full dispatch: validate the name, merge parameters, execute, and fold
    /// the result or the failure into a [`ProcedureOutcome`].
    pub async fn call_procedure(&self, call: &ProcedureCall) -> ProcedureOutcome {
        let name = match call.procedure_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => {
                tracing::error!("{}", ProcedureError::MissingName);
                return ProcedureOutcome::failure(ProcedureError::MissingName.to_string());
            }
        };

        let params = build_parameters(&call.body, &call.headers);
        match self.execute(name, &params).await {
            Ok(rows) => {
                tracing::debug!(procedure = name, rows = rows.len(), "Procedure call succeeded");
                ProcedureOutcome::success(rows)
            }
            Err(e) => {
                tracing::error!(procedure = name, error = %e, "Stored procedure call failed");
                ProcedureOutcome::failure(e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
