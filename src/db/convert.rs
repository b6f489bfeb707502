//! Post-processing: per-column value conversion driven by schema metadata.
//!
//! The driver hands some types back in a raw wire-ish form — numerics as
//! strings, bytea as hex text, json occasionally as text. The conversion
//! map, resolved once per query from the model's column metadata, lifts
//! those into their domain representation. Unmapped columns pass through
//! untouched.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::ast::{FromRef, SelectQuery};
use crate::db::execute::{ResultSet, Row};
use crate::model::Model;

pub type Converter = fn(Json) -> Json;

#[derive(Clone, Default)]
pub struct ConversionMap {
    converters: HashMap<String, Converter>,
}

impl ConversionMap {
    pub fn insert(&mut self, column: impl Into<String>, converter: Converter) {
        self.converters.insert(column.into(), converter);
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Convert every mapped column of every row, whichever shape the
    /// executor produced.
    pub fn apply(&self, set: &mut ResultSet) {
        if self.converters.is_empty() {
            return;
        }
        match set {
            ResultSet::Single(Some(row)) => self.apply_row(row),
            ResultSet::Single(None) => {}
            ResultSet::Rows(rows) => {
                for row in rows {
                    self.apply_row(row);
                }
            }
        }
    }

    fn apply_row(&self, row: &mut Row) {
        for (column, converter) in &self.converters {
            if let Some(value) = row.get_mut(column) {
                let raw = value.take();
                *value = converter(raw);
            }
        }
    }
}

/// Resolve the conversion map for a select from its target entity's column
/// metadata. Unknown entities (raw sources, derived tables) convert
/// nothing.
pub fn resolve_conversions(model: &Model, query: &SelectQuery) -> ConversionMap {
    match &query.from {
        FromRef::Table { name, .. } => entity_conversions(model, name),
        _ => ConversionMap::default(),
    }
}

/// Conversion map for one entity's columns.
pub fn entity_conversions(model: &Model, entity: &str) -> ConversionMap {
    let mut map = ConversionMap::default();
    if let Some(entity) = model.entity(entity) {
        for column in &entity.columns {
            match column.data_type.as_str() {
                "numeric" | "decimal" => map.insert(column.name.clone(), numeric_to_number),
                "json" | "jsonb" => map.insert(column.name.clone(), text_to_structured),
                "bytea" => map.insert(column.name.clone(), bytea_to_structured),
                _ => {}
            }
        }
    }
    map
}

/// Numeric wire strings become JSON numbers; integer-valued ones stay
/// integers.
fn numeric_to_number(value: Json) -> Json {
    if let Json::String(s) = &value {
        if let Ok(n) = s.parse::<i64>() {
            return Json::from(n);
        }
        if let Ok(f) = s.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Json::Number(n);
            }
        }
    }
    value
}

/// Json columns that arrived as text are parsed into structure.
fn text_to_structured(value: Json) -> Json {
    if let Json::String(s) = &value {
        if let Ok(parsed) = serde_json::from_str::<Json>(s) {
            return parsed;
        }
    }
    value
}

/// Hex-encoded bytea text becomes a structured value.
fn bytea_to_structured(value: Json) -> Json {
    if let Json::String(s) = &value {
        let hex = s.strip_prefix("\\x").unwrap_or(s);
        return serde_json::json!({ "hex": hex });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::shop_model;
    use serde_json::json;

    fn row(value: Json) -> Row {
        match value {
            Json::Object(map) => map,
            other => panic!("not an object: {:?}", other),
        }
    }

    #[test]
    fn test_resolves_numeric_and_json_columns() {
        let model = shop_model();
        let map = entity_conversions(&model, "orders");
        assert!(!map.is_empty());
        // `total` is numeric, `meta` is jsonb; `id` and `user_id` are not
        // mapped.
        let mut set = ResultSet::Rows(vec![row(json!({
            "id": 7,
            "total": "19.90",
            "meta": "{\"gift\": true}"
        }))]);
        map.apply(&mut set);
        match set {
            ResultSet::Rows(rows) => {
                assert_eq!(rows[0]["id"], json!(7));
                assert_eq!(rows[0]["total"], json!(19.90));
                assert_eq!(rows[0]["meta"], json!({"gift": true}));
            }
            other => panic!("unexpected result set: {:?}", other),
        }
    }

    #[test]
    fn test_integer_valued_numeric_stays_integer() {
        let model = shop_model();
        let map = entity_conversions(&model, "users");
        let mut set = ResultSet::Single(Some(row(json!({"balance": "42"}))));
        map.apply(&mut set);
        match set {
            ResultSet::Single(Some(r)) => assert_eq!(r["balance"], json!(42)),
            other => panic!("unexpected result set: {:?}", other),
        }
    }

    #[test]
    fn test_single_row_shapes_handled_without_branching() {
        let model = shop_model();
        let map = entity_conversions(&model, "users");
        let mut absent = ResultSet::Single(None);
        map.apply(&mut absent);
        assert_eq!(absent, ResultSet::Single(None));
    }

    #[test]
    fn test_unmapped_columns_untouched() {
        let mut map = ConversionMap::default();
        map.insert("total", numeric_to_number);
        let mut set = ResultSet::Rows(vec![row(json!({"note": "3.14"}))]);
        map.apply(&mut set);
        match set {
            ResultSet::Rows(rows) => assert_eq!(rows[0]["note"], json!("3.14")),
            other => panic!("unexpected result set: {:?}", other),
        }
    }

    #[test]
    fn test_non_string_values_pass_through() {
        assert_eq!(numeric_to_number(json!(5)), json!(5));
        assert_eq!(numeric_to_number(json!("abc")), json!("abc"));
        assert_eq!(text_to_structured(json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn test_bytea_structured() {
        assert_eq!(
            bytea_to_structured(json!("\\xdead01")),
            json!({"hex": "dead01"})
        );
    }

    #[test]
    fn test_derived_table_resolves_nothing() {
        let model = shop_model();
        let inner = crate::ast::Query::Select(Box::new(SelectQuery::new(FromRef::table(
            "users",
        ))));
        let query = SelectQuery::new(FromRef::Subselect {
            query: Box::new(inner),
            alias: Some("u".into()),
        });
        assert!(resolve_conversions(&model, &query).is_empty());
    }
}
