//! Expand execution and restitching.
//!
//! The engine wraps the whole pipeline: decompose a query with association
//! requests into flat sub-queries, run each through compile → execute →
//! post-process, then stitch the flat row sets back into the nested tree
//! the caller asked for. Sub-queries run sequentially over the one
//! connection; every one of them depends only on metadata, so a pooled
//! caller may parallelize without changing the restitch pass.
//!
//! Expand is all-or-nothing: the first failing sub-query aborts the whole
//! request and partial results are dropped.

use std::collections::HashMap;

use serde_json::Value as Json;
use tokio_postgres::Client;

use crate::ast::{decompose, has_expands, CompiledStatement, Compiler, ExpandPlan, Query};
use crate::db::convert::{entity_conversions, resolve_conversions};
use crate::db::execute::{execute, ResultSet, Row};
use crate::error::{Error, Result};
use crate::model::Model;

/// Run any statement, shaping expands when the query requests them.
///
/// Plain selects honor their `one` flag; inserts come back as their
/// post-processed RETURNING rows; raw statements pass through unshaped.
pub async fn run(client: &Client, model: &Model, query: &Query) -> Result<Json> {
    match query {
        Query::Select(select) if has_expands(select) => {
            run_expanded(client, model, select).await
        }
        Query::Select(select) => {
            let stmt = Compiler::new(model).compile(query)?;
            let mut set = execute(client, &stmt, select.one).await?;
            resolve_conversions(model, select).apply(&mut set);
            Ok(set.into_json())
        }
        Query::Insert(insert) => {
            let stmt = Compiler::new(model).compile(query)?;
            let mut set = execute(client, &stmt, false).await?;
            entity_conversions(model, &insert.into).apply(&mut set);
            Ok(set.into_json())
        }
        // Raw statements pass through with no shaping at all.
        Query::Raw { .. } => {
            let stmt = Compiler::new(model).compile(query)?;
            let set = execute(client, &stmt, false).await?;
            Ok(set.into_json())
        }
    }
}

async fn run_expanded(
    client: &Client,
    model: &Model,
    select: &crate::ast::SelectQuery,
) -> Result<Json> {
    let plan = decompose(select, model)?;

    // Compile the whole plan before the first roundtrip; compilation
    // failures stay ordinary compile errors.
    let compiler = Compiler::new(model);
    let mut compiled: Vec<CompiledStatement> = Vec::with_capacity(plan.queries.len());
    for planned in &plan.queries {
        compiled.push(compiler.compile(&Query::Select(Box::new(planned.query.clone())))?);
    }

    let mut sets: Vec<Vec<Row>> = Vec::with_capacity(plan.queries.len());
    for (planned, stmt) in plan.queries.iter().zip(&compiled) {
        tracing::debug!(path = %planned.path.join("."), "running expand sub-query");
        let mut set = execute(client, stmt, false)
            .await
            .map_err(|err| Error::expand_aborted(&planned.path, err))?;
        resolve_conversions(model, &planned.query).apply(&mut set);
        let rows = match set {
            ResultSet::Rows(rows) => rows,
            ResultSet::Single(row) => row.into_iter().collect(),
        };
        sets.push(rows);
    }

    Ok(restitch(&plan, sets))
}

/// Stitch flat result sets back into the nested tree.
///
/// Deepest paths are attached first, so child rows already carry their own
/// children by the time they move into their parents. For every parent row
/// the matching group attaches under the association name — a single object
/// when that level's cardinality is one, else the full ordered group; a
/// parent with no matching children gets `[]` (to-many) or `null` (to-one).
pub(crate) fn restitch(plan: &ExpandPlan, mut sets: Vec<Vec<Row>>) -> Json {
    if plan.queries.is_empty() || sets.len() != plan.queries.len() {
        return Json::Null;
    }

    let index: HashMap<&[String], usize> = plan
        .queries
        .iter()
        .enumerate()
        .map(|(i, q)| (q.path.as_slice(), i))
        .collect();

    let mut order: Vec<usize> = (0..plan.queries.len()).collect();
    order.sort_by(|a, b| plan.queries[*b].path.len().cmp(&plan.queries[*a].path.len()));

    for i in order {
        let planned = &plan.queries[i];
        if planned.path.is_empty() {
            continue;
        }
        let Some(link) = planned.link.as_ref() else {
            continue;
        };
        let Some(assoc_name) = planned.path.last().cloned() else {
            continue;
        };
        let Some(&parent_idx) = index.get(&planned.path[..planned.path.len() - 1]) else {
            continue;
        };

        let child_rows = std::mem::take(&mut sets[i]);
        let mut groups: HashMap<String, Vec<Json>> = HashMap::new();
        for row in child_rows {
            let key = key_of(&row, &link.child_cols);
            groups.entry(key).or_default().push(Json::Object(row));
        }

        for parent in &mut sets[parent_idx] {
            let key = key_of(parent, &link.parent_cols);
            let value = match groups.get(&key) {
                Some(group) if link.one => group.first().cloned().unwrap_or(Json::Null),
                Some(group) => Json::Array(group.clone()),
                None if link.one => Json::Null,
                None => Json::Array(Vec::new()),
            };
            parent.insert(assoc_name.clone(), value);
        }
    }

    let root_one = plan.queries[0].query.one;
    let root_rows = std::mem::take(&mut sets[0]);
    if root_one {
        root_rows
            .into_iter()
            .next()
            .map(Json::Object)
            .unwrap_or(Json::Null)
    } else {
        Json::Array(root_rows.into_iter().map(Json::Object).collect())
    }
}

/// Correlation key of one row: the JSON encoding of its key column values.
fn key_of(row: &Row, cols: &[String]) -> String {
    let values: Vec<&Json> = cols
        .iter()
        .map(|c| row.get(c).unwrap_or(&Json::Null))
        .collect();
    serde_json::to_string(&values).unwrap_or_default()
}
