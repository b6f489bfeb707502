//! Expand decomposition.
//!
//! One logical query with nested association requests becomes an ordered
//! sequence of flat queries plus the metadata needed to stitch their rows
//! back together. Decomposition is a pure AST-to-AST transformation; no row
//! data is involved.
//!
//! Every planned child query is independent of its siblings' *results*: it
//! correlates through `(fk…) IN (SELECT key… FROM <parent source> WHERE
//! <parent filter>)`, which is known up front from the model. Plan order is
//! shallower paths first, parents before their children.

use crate::ast::types::*;
use crate::error::{Error, Result};
use crate::model::{Cardinality, Model};

/// How a decomposed query's rows re-attach to the rows one level up.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationLink {
    /// Key columns read from the parent's rows.
    pub parent_cols: Vec<String>,
    /// Key columns read from this query's rows.
    pub child_cols: Vec<String>,
    /// Attach a single object instead of an array.
    pub one: bool,
}

/// One flat query of an expand plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    /// Association names from the root; empty for the root itself.
    pub path: Vec<String>,
    pub query: SelectQuery,
    /// `None` for the root.
    pub link: Option<CorrelationLink>,
}

/// The ordered decomposition of one logical query.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandPlan {
    pub queries: Vec<PlannedQuery>,
}

/// Whether a select carries any association requests at all.
pub fn has_expands(select: &SelectQuery) -> bool {
    select
        .items
        .iter()
        .any(|item| matches!(item, SelectItem::Expand(_)))
}

/// Decompose a select into an ordered plan of flat queries.
pub fn decompose(select: &SelectQuery, model: &Model) -> Result<ExpandPlan> {
    let mut queries = Vec::new();
    walk(Vec::new(), select.clone(), None, model, &mut queries)?;
    Ok(ExpandPlan { queries })
}

fn walk(
    path: Vec<String>,
    mut select: SelectQuery,
    link: Option<CorrelationLink>,
    model: &Model,
    out: &mut Vec<PlannedQuery>,
) -> Result<()> {
    let mut expands = Vec::new();
    let mut items = Vec::new();
    for item in select.items.drain(..) {
        match item {
            SelectItem::Expand(expand) => expands.push(expand),
            other => items.push(other),
        }
    }
    select.items = items;

    if expands.is_empty() {
        out.push(PlannedQuery {
            path,
            query: select,
            link,
        });
        return Ok(());
    }

    let entity_name = match &select.from {
        FromRef::Table { name, .. } => name.clone(),
        _ => {
            return Err(Error::Compile(
                "expand requires a plain table source".into(),
            ))
        }
    };
    let entity = model.expect_entity(&entity_name)?;

    // Restitching reads the parent-side key columns off the parent rows, so
    // they must survive the projection.
    for expand in &expands {
        let assoc = entity.association(&expand.assoc)?;
        for (parent_col, _) in &assoc.fk {
            ensure_column(&mut select.items, parent_col);
        }
    }

    let parent_from = select.from.clone();
    let parent_filter = select.filter.clone();

    out.push(PlannedQuery {
        path: path.clone(),
        query: select,
        link,
    });

    for expand in expands {
        let assoc = entity.association(&expand.assoc)?;
        let target = model.expect_entity(&assoc.target)?;
        let one = expand
            .one
            .unwrap_or(assoc.cardinality == Cardinality::One);

        let parent_cols: Vec<String> = assoc.fk.iter().map(|(p, _)| p.clone()).collect();
        let child_cols: Vec<String> = assoc.fk.iter().map(|(_, c)| c.clone()).collect();

        // Correlate against the parent *query*, never its rows.
        let key_query = SelectQuery {
            items: parent_cols
                .iter()
                .map(|c| SelectItem::column(c.clone()))
                .collect(),
            filter: parent_filter.clone(),
            ..SelectQuery::new(parent_from.clone())
        };
        let correlation = Expression::InSubquery {
            expr: Box::new(column_tuple(&child_cols)),
            query: Box::new(Query::Select(Box::new(key_query))),
            negated: false,
        };

        let mut child_items = expand.items;
        for col in &child_cols {
            ensure_column(&mut child_items, col);
        }
        let child = SelectQuery {
            items: child_items,
            filter: Some(match expand.filter {
                Some(own) => {
                    Expression::and(Expression::Nested(Box::new(own)), correlation)
                }
                None => correlation,
            }),
            order_by: expand.order_by,
            ..SelectQuery::new(FromRef::Table {
                schema: target.schema.clone(),
                name: target.name.clone(),
                alias: None,
            })
        };

        let mut child_path = path.clone();
        child_path.push(expand.assoc.clone());
        walk(
            child_path,
            child,
            Some(CorrelationLink {
                parent_cols,
                child_cols,
                one,
            }),
            model,
            out,
        )?;
    }
    Ok(())
}

/// Single column or row-value tuple for multi-column keys.
fn column_tuple(cols: &[String]) -> Expression {
    if cols.len() == 1 {
        Expression::column(cols[0].clone())
    } else {
        Expression::Row(cols.iter().map(|c| Expression::column(c.clone())).collect())
    }
}

/// Add a plain column to a projection unless it is already covered. An
/// empty projection means `SELECT *`, which covers everything.
fn ensure_column(items: &mut Vec<SelectItem>, name: &str) {
    if items.is_empty() {
        return;
    }
    let covered = items.iter().any(|item| match item {
        SelectItem::Wildcard => true,
        SelectItem::Expr {
            expr: Expression::Column { name: n, .. },
            alias,
        } => alias.is_none() && n == name,
        _ => false,
    });
    if !covered {
        items.push(SelectItem::column(name));
    }
}
