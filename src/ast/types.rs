//! Query notation types for pgnest.
//!
//! This module defines the dialect-neutral representation consumed by the
//! compiler and the expand engine. The notation is designed to be:
//! - Language-agnostic (callers build nodes directly or deserialize JSON)
//! - Immutable-friendly (clone-based transformations)
//! - Closed (statement kinds are a fixed tagged enum, dispatched by match)

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};

/// Top-level statement representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Select(Box<SelectQuery>),
    Insert(InsertQuery),
    /// Raw SQL passthrough. Uses `?` parameter markers; the compiler only
    /// rewrites them into `$n` and forwards the values untouched.
    Raw { sql: String, values: Vec<Value> },
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    pub from: FromRef,
    #[serde(default)]
    pub items: Vec<SelectItem>,
    #[serde(default)]
    pub filter: Option<Expression>,
    #[serde(default)]
    pub group_by: Vec<Expression>,
    #[serde(default)]
    pub order_by: Vec<OrderByExpr>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub distinct: bool,
    /// Point lookup: the caller wants a single row, not a row set.
    #[serde(default)]
    pub one: bool,
}

impl SelectQuery {
    /// A bare `SELECT * FROM <from>`; callers fill the rest with struct
    /// update syntax.
    pub fn new(from: FromRef) -> Self {
        Self {
            from,
            items: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: false,
            one: false,
        }
    }
}

/// A FROM source. Joins are n-ary chains: `anchor` is argument 0 and each
/// branch carries its own join kind and ON condition relative to the
/// accumulated result so far (left-to-right linearization, not a binary
/// tree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FromRef {
    Table {
        #[serde(default)]
        schema: Option<String>,
        name: String,
        #[serde(default)]
        alias: Option<String>,
    },
    Join {
        anchor: Box<FromRef>,
        branches: Vec<JoinBranch>,
    },
    /// Derived table: `(SELECT ...) AS alias`. The alias may be omitted here
    /// only when the enclosing context supplies one.
    Subselect {
        query: Box<Query>,
        #[serde(default)]
        alias: Option<String>,
    },
    /// Set operation used as a derived table: `(q1 UNION q2 ...) AS alias`.
    Union {
        branches: Vec<Query>,
        #[serde(default)]
        all: bool,
        #[serde(default)]
        alias: Option<String>,
    },
}

impl FromRef {
    pub fn table(name: impl Into<String>) -> Self {
        FromRef::Table {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased_table(name: impl Into<String>, alias: impl Into<String>) -> Self {
        FromRef::Table {
            schema: None,
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// One branch of a join chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinBranch {
    pub kind: JoinKind,
    pub source: FromRef,
    #[serde(default)]
    pub on: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// A single item in the SELECT projection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectItem {
    /// `*`
    Wildcard,
    /// An expression, optionally aliased: `expr AS alias`.
    Expr {
        expr: Expression,
        #[serde(default)]
        alias: Option<String>,
    },
    /// A nested association request. Never compiled directly: the expand
    /// engine decomposes these into correlated flat queries first.
    Expand(ExpandItem),
}

impl SelectItem {
    pub fn column(name: impl Into<String>) -> Self {
        SelectItem::Expr {
            expr: Expression::Column {
                table: None,
                name: name.into(),
            },
            alias: None,
        }
    }
}

/// A request to include an associated entity's rows nested inside the
/// parent's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandItem {
    /// Association name, resolved against the parent entity in the model.
    pub assoc: String,
    /// Projection for the associated rows; empty means `*`. May itself
    /// contain further expands.
    #[serde(default)]
    pub items: Vec<SelectItem>,
    #[serde(default)]
    pub filter: Option<Expression>,
    #[serde(default)]
    pub order_by: Vec<OrderByExpr>,
    /// Cardinality override; defaults to the association's own cardinality.
    #[serde(default)]
    pub one: Option<bool>,
}

/// Core expression type. Recursive to support arbitrary nesting. Literals
/// are compiled into parameter markers, never inlined into SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Column reference: `table.column` or just `column`.
    Column {
        #[serde(default)]
        table: Option<String>,
        name: String,
    },
    /// Literal value, emitted as a bound parameter.
    Literal(Value),
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
    /// Scalar function call: `name(args)`.
    Function { name: String, args: Vec<Expression> },
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        #[serde(default)]
        negated: bool,
    },
    InSubquery {
        expr: Box<Expression>,
        query: Box<Query>,
        #[serde(default)]
        negated: bool,
    },
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        #[serde(default)]
        negated: bool,
    },
    IsNull {
        expr: Box<Expression>,
        #[serde(default)]
        negated: bool,
    },
    Cast {
        expr: Box<Expression>,
        data_type: String,
    },
    /// Row-value constructor: `(a, b)`. Used for multi-column IN.
    Row(Vec<Expression>),
    /// Parenthesized expression.
    Nested(Box<Expression>),
    /// `*`, as in `count(*)`.
    Wildcard,
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary(left, BinaryOperator::Eq, right)
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(left, BinaryOperator::And, right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Like,
    ILike,
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

/// ORDER BY expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByExpr {
    pub expr: Expression,
    #[serde(default)]
    pub asc: Option<bool>,
    #[serde(default)]
    pub nulls_first: Option<bool>,
}

/// An INSERT statement. Row values are always bound as parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertQuery {
    #[serde(default)]
    pub schema: Option<String>,
    pub into: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Report the inserted rows back (compiled as `RETURNING *`).
    #[serde(default)]
    pub returning: bool,
}

/// A parameter or literal scalar. This is what ends up in
/// `CompiledStatement::values` and binds directly to the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Structured value bound as json/jsonb.
    Json(serde_json::Value),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        // Numeric widths follow the prepared statement's inferred type, so
        // an i64 notation value still binds cleanly against an int4 column.
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Integer(i) => match *ty {
                Type::INT2 => (*i as i16).to_sql(ty, out),
                Type::INT4 => (*i as i32).to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql(ty, out),
            },
            Value::Text(s) => s.to_sql(ty, out),
            Value::Json(j) => j.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
