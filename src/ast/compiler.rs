//! Notation → SQL compiler.
//!
//! Turns a [`Query`] into PostgreSQL text plus an ordered parameter list.
//! Literals are never inlined: every one becomes a generic `?` marker and a
//! collected [`Value`], and the Nth marker always corresponds to the Nth
//! value — clause compilation appends text and values strictly in emission
//! order, and the final `$n` rewrite preserves that correspondence.
//!
//! The compiler is one object carrying its whole capability set (`&Model`
//! plus its own sub-compilers as plain methods), threaded through every
//! recursive call. Statement kinds are a closed enum dispatched by match.

use crate::ast::placeholder::rewrite_placeholders;
use crate::ast::types::*;
use crate::error::{Error, Result};
use crate::model::Model;

/// A fully compiled statement: SQL text with `$1..$n` markers and the
/// parameter values in marker order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub values: Vec<Value>,
}

/// Compiles query notation against a schema model.
pub struct Compiler<'a> {
    model: &'a Model,
}

impl<'a> Compiler<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Compile a statement. Deterministic: the same notation and model
    /// always produce byte-identical output.
    pub fn compile(&self, query: &Query) -> Result<CompiledStatement> {
        let mut values = Vec::new();
        let raw = self.compile_query(query, &mut values)?;
        let mut sql = rewrite_placeholders(&raw);
        // RETURNING introduces no parameters, so appending after the
        // placeholder rewrite cannot disturb marker numbering.
        if let Query::Insert(insert) = query {
            if insert.returning {
                sql.push_str(" RETURNING *");
            }
        }
        tracing::debug!(sql = %sql, params = values.len(), "compiled statement");
        Ok(CompiledStatement { sql, values })
    }

    fn compile_query(&self, query: &Query, values: &mut Vec<Value>) -> Result<String> {
        match query {
            Query::Select(select) => self.compile_select(select, values),
            Query::Insert(insert) => self.compile_insert(insert, values),
            Query::Raw { sql, values: raw } => {
                values.extend(raw.iter().cloned());
                Ok(sql.clone())
            }
        }
    }

    fn compile_select(&self, select: &SelectQuery, values: &mut Vec<Value>) -> Result<String> {
        let mut parts = Vec::new();

        let mut select_clause = String::from("SELECT ");
        if select.distinct {
            select_clause.push_str("DISTINCT ");
        }
        if select.items.is_empty() {
            select_clause.push('*');
        } else {
            let items = select
                .items
                .iter()
                .map(|item| self.compile_select_item(item, values))
                .collect::<Result<Vec<_>>>()?;
            select_clause.push_str(&items.join(", "));
        }
        parts.push(select_clause);

        parts.push(format!(
            "FROM {}",
            self.compile_from(&select.from, None, values)?
        ));

        if let Some(ref filter) = select.filter {
            parts.push(format!("WHERE {}", self.compile_expr(filter, values)?));
        }

        if !select.group_by.is_empty() {
            let groups = select
                .group_by
                .iter()
                .map(|g| self.compile_expr(g, values))
                .collect::<Result<Vec<_>>>()?;
            parts.push(format!("GROUP BY {}", groups.join(", ")));
        }

        if !select.order_by.is_empty() {
            let orders = select
                .order_by
                .iter()
                .map(|o| self.compile_order_by(o, values))
                .collect::<Result<Vec<_>>>()?;
            parts.push(format!("ORDER BY {}", orders.join(", ")));
        }

        if let Some(limit) = select.limit {
            parts.push(format!("LIMIT {}", limit));
        }
        if let Some(offset) = select.offset {
            parts.push(format!("OFFSET {}", offset));
        }

        Ok(parts.join(" "))
    }

    fn compile_select_item(&self, item: &SelectItem, values: &mut Vec<Value>) -> Result<String> {
        match item {
            SelectItem::Wildcard => Ok("*".to_string()),
            SelectItem::Expr { expr, alias } => {
                let expr_sql = self.compile_expr(expr, values)?;
                Ok(match alias {
                    Some(a) => format!("{} AS {}", expr_sql, quote_ident(a)),
                    None => expr_sql,
                })
            }
            SelectItem::Expand(item) => Err(Error::Compile(format!(
                "expand `{}` must be decomposed before compilation",
                item.assoc
            ))),
        }
    }

    /// Linearize a FROM tree, appending parameter values in emission order.
    ///
    /// `context_alias` is the alias supplied by the enclosing context; a
    /// derived table resolves its alias element-local first, then from the
    /// context, and fails otherwise — this dialect requires every derived
    /// table to carry one.
    fn compile_from(
        &self,
        from: &FromRef,
        context_alias: Option<&str>,
        values: &mut Vec<Value>,
    ) -> Result<String> {
        match from {
            FromRef::Table {
                schema,
                name,
                alias,
            } => {
                let mut sql = self.compile_table_ref(schema.as_deref(), name);
                if let Some(a) = alias.as_deref().or(context_alias) {
                    sql.push_str(" AS ");
                    sql.push_str(&quote_ident(a));
                }
                Ok(sql)
            }
            FromRef::Join { anchor, branches } => {
                // Argument 0 opens the chain; every branch extends the
                // accumulated result left-to-right with its own kind and ON.
                let mut sql = self.compile_from(anchor, context_alias, values)?;
                for branch in branches {
                    sql.push(' ');
                    sql.push_str(join_keyword(branch.kind));
                    sql.push(' ');
                    let source = self.compile_from(&branch.source, None, values)?;
                    // A nested join chain on the right side keeps its own
                    // grouping only when parenthesized.
                    if matches!(branch.source, FromRef::Join { .. }) {
                        sql.push('(');
                        sql.push_str(&source);
                        sql.push(')');
                    } else {
                        sql.push_str(&source);
                    }
                    if let Some(ref on) = branch.on {
                        sql.push_str(" ON ");
                        sql.push_str(&self.compile_expr(on, values)?);
                    }
                }
                Ok(sql)
            }
            FromRef::Subselect { query, alias } => {
                let alias = resolve_derived_alias(alias.as_deref(), context_alias)?;
                let inner = self.compile_query(query, values)?;
                Ok(format!("({}) AS {}", inner, quote_ident(&alias)))
            }
            FromRef::Union {
                branches,
                all,
                alias,
            } => {
                let alias = resolve_derived_alias(alias.as_deref(), context_alias)?;
                if branches.is_empty() {
                    return Err(Error::Compile("union requires at least one branch".into()));
                }
                let op = if *all { " UNION ALL " } else { " UNION " };
                let compiled = branches
                    .iter()
                    .map(|b| self.compile_query(b, values))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({}) AS {}", compiled.join(op), quote_ident(&alias)))
            }
        }
    }

    /// Schema-qualified, quoted table reference. An unqualified name whose
    /// entity the model knows picks up the entity's schema.
    fn compile_table_ref(&self, schema: Option<&str>, name: &str) -> String {
        let resolved = schema
            .map(str::to_string)
            .or_else(|| self.model.entity(name).and_then(|e| e.schema.clone()));
        match resolved {
            Some(s) => format!("{}.{}", quote_ident(&s), quote_ident(name)),
            None => quote_ident(name),
        }
    }

    fn compile_expr(&self, expr: &Expression, values: &mut Vec<Value>) -> Result<String> {
        match expr {
            Expression::Column { table, name } => Ok(match table {
                Some(t) => format!("{}.{}", quote_ident(t), quote_ident(name)),
                None => quote_ident(name),
            }),
            Expression::Literal(value) => {
                values.push(value.clone());
                Ok("?".to_string())
            }
            Expression::BinaryOp { left, op, right } => Ok(format!(
                "{} {} {}",
                self.compile_expr(left, values)?,
                binary_operator(*op),
                self.compile_expr(right, values)?
            )),
            Expression::UnaryOp { op, expr } => {
                let op_str = match op {
                    UnaryOperator::Not => "NOT",
                    UnaryOperator::Minus => "-",
                    UnaryOperator::Plus => "+",
                };
                Ok(format!("{} {}", op_str, self.compile_expr(expr, values)?))
            }
            Expression::Function { name, args } => {
                let args = args
                    .iter()
                    .map(|a| self.compile_expr(a, values))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{}({})", name, args.join(", ")))
            }
            Expression::InList {
                expr,
                list,
                negated,
            } => {
                let lhs = self.compile_expr(expr, values)?;
                let items = list
                    .iter()
                    .map(|e| self.compile_expr(e, values))
                    .collect::<Result<Vec<_>>>()?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{} {}IN ({})", lhs, not, items.join(", ")))
            }
            Expression::InSubquery {
                expr,
                query,
                negated,
            } => {
                let lhs = self.compile_expr(expr, values)?;
                let not = if *negated { "NOT " } else { "" };
                let inner = self.compile_query(query, values)?;
                Ok(format!("{} {}IN ({})", lhs, not, inner))
            }
            Expression::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let lhs = self.compile_expr(expr, values)?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!(
                    "{} {}BETWEEN {} AND {}",
                    lhs,
                    not,
                    self.compile_expr(low, values)?,
                    self.compile_expr(high, values)?
                ))
            }
            Expression::IsNull { expr, negated } => {
                let lhs = self.compile_expr(expr, values)?;
                Ok(if *negated {
                    format!("{} IS NOT NULL", lhs)
                } else {
                    format!("{} IS NULL", lhs)
                })
            }
            Expression::Cast { expr, data_type } => Ok(format!(
                "CAST({} AS {})",
                self.compile_expr(expr, values)?,
                data_type
            )),
            Expression::Row(items) => {
                let items = items
                    .iter()
                    .map(|e| self.compile_expr(e, values))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", items.join(", ")))
            }
            Expression::Nested(inner) => {
                Ok(format!("({})", self.compile_expr(inner, values)?))
            }
            Expression::Wildcard => Ok("*".to_string()),
        }
    }

    fn compile_order_by(&self, order: &OrderByExpr, values: &mut Vec<Value>) -> Result<String> {
        let mut sql = self.compile_expr(&order.expr, values)?;
        match order.asc {
            Some(true) => sql.push_str(" ASC"),
            Some(false) => sql.push_str(" DESC"),
            None => {}
        }
        match order.nulls_first {
            Some(true) => sql.push_str(" NULLS FIRST"),
            Some(false) => sql.push_str(" NULLS LAST"),
            None => {}
        }
        Ok(sql)
    }

    fn compile_insert(&self, insert: &InsertQuery, values: &mut Vec<Value>) -> Result<String> {
        if insert.rows.is_empty() {
            return Err(Error::Compile("insert requires at least one row".into()));
        }
        let table = self.compile_table_ref(insert.schema.as_deref(), &insert.into);

        let columns = if insert.columns.is_empty() {
            String::new()
        } else {
            let cols: Vec<String> = insert.columns.iter().map(|c| quote_ident(c)).collect();
            format!(" ({})", cols.join(", "))
        };

        let mut row_strs = Vec::with_capacity(insert.rows.len());
        for row in &insert.rows {
            if !insert.columns.is_empty() && row.len() != insert.columns.len() {
                return Err(Error::Compile(format!(
                    "insert row has {} values but {} columns were named",
                    row.len(),
                    insert.columns.len()
                )));
            }
            let markers = vec!["?"; row.len()];
            values.extend(row.iter().cloned());
            row_strs.push(format!("({})", markers.join(", ")));
        }

        Ok(format!(
            "INSERT INTO {}{} VALUES {}",
            table,
            columns,
            row_strs.join(", ")
        ))
    }
}

fn join_keyword(kind: JoinKind) -> &'static str {
    match kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::Left => "LEFT JOIN",
        JoinKind::Right => "RIGHT JOIN",
        JoinKind::Full => "FULL JOIN",
        JoinKind::Cross => "CROSS JOIN",
    }
}

fn binary_operator(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Eq => "=",
        BinaryOperator::NotEq => "<>",
        BinaryOperator::Lt => "<",
        BinaryOperator::LtEq => "<=",
        BinaryOperator::Gt => ">",
        BinaryOperator::GtEq => ">=",
        BinaryOperator::And => "AND",
        BinaryOperator::Or => "OR",
        BinaryOperator::Plus => "+",
        BinaryOperator::Minus => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulo => "%",
        BinaryOperator::Like => "LIKE",
        BinaryOperator::ILike => "ILIKE",
        BinaryOperator::Concat => "||",
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Alias precedence for derived tables: element-local first, else the
/// enclosing context's, else a compile error.
fn resolve_derived_alias(local: Option<&str>, context: Option<&str>) -> Result<String> {
    local
        .or(context)
        .map(str::to_string)
        .ok_or_else(|| Error::Compile("derived table requires an alias".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn compile(query: &Query) -> Result<CompiledStatement> {
        let model = Model::new();
        Compiler::new(&model).compile(query)
    }

    fn select(from: FromRef) -> SelectQuery {
        SelectQuery::new(from)
    }

    #[test]
    fn test_simple_select() {
        let q = Query::Select(Box::new(select(FromRef::table("users"))));
        let stmt = compile(&q).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"users\"");
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_select_with_filter_params() {
        let q = Query::Select(Box::new(SelectQuery {
            items: vec![SelectItem::column("id"), SelectItem::column("name")],
            filter: Some(Expression::and(
                Expression::eq(Expression::column("age"), Expression::literal(18i64)),
                Expression::eq(Expression::column("city"), Expression::literal("Berlin")),
            )),
            ..select(FromRef::table("users"))
        }));
        let stmt = compile(&q).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"id\", \"name\" FROM \"users\" WHERE \"age\" = $1 AND \"city\" = $2"
        );
        assert_eq!(
            stmt.values,
            vec![Value::Integer(18), Value::Text("Berlin".into())]
        );
    }

    #[test]
    fn test_join_linearization_order() {
        // Anchor t0, branch 1 inner on A, branch 2 left on B: the SQL reads
        // left-to-right and A's params land before B's.
        let from = FromRef::Join {
            anchor: Box::new(FromRef::table("t0")),
            branches: vec![
                JoinBranch {
                    kind: JoinKind::Inner,
                    source: FromRef::table("t1"),
                    on: Some(Expression::and(
                        Expression::eq(
                            Expression::qualified("t0", "id"),
                            Expression::qualified("t1", "t0_id"),
                        ),
                        Expression::eq(
                            Expression::qualified("t1", "tag"),
                            Expression::literal("A"),
                        ),
                    )),
                },
                JoinBranch {
                    kind: JoinKind::Left,
                    source: FromRef::table("t2"),
                    on: Some(Expression::eq(
                        Expression::qualified("t2", "tag"),
                        Expression::literal("B"),
                    )),
                },
            ],
        };
        let stmt = compile(&Query::Select(Box::new(select(from)))).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"t0\" \
             INNER JOIN \"t1\" ON \"t0\".\"id\" = \"t1\".\"t0_id\" AND \"t1\".\"tag\" = $1 \
             LEFT JOIN \"t2\" ON \"t2\".\"tag\" = $2"
        );
        assert_eq!(
            stmt.values,
            vec![Value::Text("A".into()), Value::Text("B".into())]
        );
    }

    #[test]
    fn test_nested_join_recurses() {
        let inner_join = FromRef::Join {
            anchor: Box::new(FromRef::table("b")),
            branches: vec![JoinBranch {
                kind: JoinKind::Inner,
                source: FromRef::table("c"),
                on: Some(Expression::eq(
                    Expression::qualified("b", "id"),
                    Expression::qualified("c", "b_id"),
                )),
            }],
        };
        let from = FromRef::Join {
            anchor: Box::new(FromRef::table("a")),
            branches: vec![JoinBranch {
                kind: JoinKind::Left,
                source: inner_join,
                on: Some(Expression::eq(
                    Expression::qualified("a", "id"),
                    Expression::qualified("b", "a_id"),
                )),
            }],
        };
        let stmt = compile(&Query::Select(Box::new(select(from)))).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"a\" LEFT JOIN \
             (\"b\" INNER JOIN \"c\" ON \"b\".\"id\" = \"c\".\"b_id\") \
             ON \"a\".\"id\" = \"b\".\"a_id\""
        );
    }

    #[test]
    fn test_subselect_requires_alias() {
        let inner = Query::Select(Box::new(select(FromRef::table("users"))));
        let from = FromRef::Subselect {
            query: Box::new(inner),
            alias: None,
        };
        let err = compile(&Query::Select(Box::new(select(from)))).unwrap_err();
        match err {
            Error::Compile(msg) => assert!(msg.contains("alias")),
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_subselect_context_alias() {
        // No element-local alias, but the enclosing context supplies one.
        let model = Model::new();
        let compiler = Compiler::new(&model);
        let inner = Query::Select(Box::new(select(FromRef::table("users"))));
        let from = FromRef::Subselect {
            query: Box::new(inner),
            alias: None,
        };
        let mut values = Vec::new();
        let sql = compiler
            .compile_from(&from, Some("ctx"), &mut values)
            .unwrap();
        assert_eq!(sql, "(SELECT * FROM \"users\") AS \"ctx\"");
    }

    #[test]
    fn test_local_alias_beats_context() {
        let model = Model::new();
        let compiler = Compiler::new(&model);
        let inner = Query::Select(Box::new(select(FromRef::table("users"))));
        let from = FromRef::Subselect {
            query: Box::new(inner),
            alias: Some("own".into()),
        };
        let mut values = Vec::new();
        let sql = compiler
            .compile_from(&from, Some("ctx"), &mut values)
            .unwrap();
        assert!(sql.ends_with("AS \"own\""));
    }

    #[test]
    fn test_union_branch_params_in_order() {
        let mut left = select(FromRef::table("a"));
        left.filter = Some(Expression::eq(
            Expression::column("x"),
            Expression::literal(1i64),
        ));
        let mut right = select(FromRef::table("b"));
        right.filter = Some(Expression::eq(
            Expression::column("y"),
            Expression::literal(2i64),
        ));
        let from = FromRef::Union {
            branches: vec![
                Query::Select(Box::new(left)),
                Query::Select(Box::new(right)),
            ],
            all: true,
            alias: Some("u".into()),
        };
        let stmt = compile(&Query::Select(Box::new(select(from)))).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM (SELECT * FROM \"a\" WHERE \"x\" = $1 \
             UNION ALL \
             SELECT * FROM \"b\" WHERE \"y\" = $2) AS \"u\""
        );
        assert_eq!(stmt.values, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_union_as_join_branch_requires_alias() {
        let union = FromRef::Union {
            branches: vec![Query::Select(Box::new(select(FromRef::table("a"))))],
            all: false,
            alias: None,
        };
        let from = FromRef::Join {
            anchor: Box::new(FromRef::table("t")),
            branches: vec![JoinBranch {
                kind: JoinKind::Inner,
                source: union,
                on: None,
            }],
        };
        let err = compile(&Query::Select(Box::new(select(from)))).unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
    }

    #[test]
    fn test_insert_returning() {
        let q = Query::Insert(InsertQuery {
            schema: None,
            into: "users".into(),
            columns: vec!["name".into(), "age".into()],
            rows: vec![
                vec![Value::Text("ann".into()), Value::Integer(31)],
                vec![Value::Text("bob".into()), Value::Integer(45)],
            ],
            returning: true,
        });
        let stmt = compile(&q).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"users\" (\"name\", \"age\") VALUES ($1, $2), ($3, $4) RETURNING *"
        );
        assert!(stmt.sql.ends_with("RETURNING *"));
        assert_eq!(stmt.values.len(), 4);
    }

    #[test]
    fn test_insert_without_returning() {
        let q = Query::Insert(InsertQuery {
            schema: None,
            into: "users".into(),
            columns: vec!["name".into()],
            rows: vec![vec![Value::Text("ann".into())]],
            returning: false,
        });
        let stmt = compile(&q).unwrap();
        assert!(!stmt.sql.contains("RETURNING"));
    }

    #[test]
    fn test_insert_row_arity_mismatch() {
        let q = Query::Insert(InsertQuery {
            schema: None,
            into: "users".into(),
            columns: vec!["name".into(), "age".into()],
            rows: vec![vec![Value::Text("ann".into())]],
            returning: false,
        });
        assert!(matches!(compile(&q), Err(Error::Compile(_))));
    }

    #[test]
    fn test_expand_item_rejected() {
        let q = Query::Select(Box::new(SelectQuery {
            items: vec![SelectItem::Expand(ExpandItem {
                assoc: "orders".into(),
                items: vec![],
                filter: None,
                order_by: vec![],
                one: None,
            })],
            ..select(FromRef::table("users"))
        }));
        let err = compile(&q).unwrap_err();
        match err {
            Error::Compile(msg) => assert!(msg.contains("decomposed")),
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let q = Query::Select(Box::new(SelectQuery {
            items: vec![SelectItem::column("id")],
            filter: Some(Expression::eq(
                Expression::column("id"),
                Expression::literal(7i64),
            )),
            order_by: vec![OrderByExpr {
                expr: Expression::column("id"),
                asc: Some(false),
                nulls_first: None,
            }],
            limit: Some(10),
            offset: Some(5),
            ..select(FromRef::table("users"))
        }));
        let a = compile(&q).unwrap();
        let b = compile(&q).unwrap();
        assert_eq!(a.sql, b.sql);
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_raw_passthrough() {
        let q = Query::Raw {
            sql: "SELECT * FROM pg_stat_activity WHERE state = ?".into(),
            values: vec![Value::Text("active".into())],
        };
        let stmt = compile(&q).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM pg_stat_activity WHERE state = $1"
        );
        assert_eq!(stmt.values, vec![Value::Text("active".into())]);
    }

    #[test]
    fn test_schema_resolved_from_model() {
        use crate::model::{Column, Entity};
        let mut model = Model::new();
        model.add_entity(Entity {
            name: "users".into(),
            schema: Some("app".into()),
            keys: vec!["id".into()],
            columns: vec![Column {
                name: "id".into(),
                data_type: "integer".into(),
            }],
            associations: Default::default(),
        });
        let stmt = Compiler::new(&model)
            .compile(&Query::Select(Box::new(select(FromRef::table("users")))))
            .unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"app\".\"users\"");
    }

    #[test]
    fn test_in_subquery_expression() {
        let inner = Query::Select(Box::new(SelectQuery {
            items: vec![SelectItem::column("user_id")],
            filter: Some(Expression::eq(
                Expression::column("status"),
                Expression::literal("active"),
            )),
            ..select(FromRef::table("sessions"))
        }));
        let q = Query::Select(Box::new(SelectQuery {
            filter: Some(Expression::InSubquery {
                expr: Box::new(Expression::column("id")),
                query: Box::new(inner),
                negated: false,
            }),
            ..select(FromRef::table("users"))
        }));
        let stmt = compile(&q).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"users\" WHERE \"id\" IN \
             (SELECT \"user_id\" FROM \"sessions\" WHERE \"status\" = $1)"
        );
    }
}
