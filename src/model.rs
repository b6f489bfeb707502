//! Schema catalog: the read-only lookup structure the compiler and expand
//! engine resolve entities, column types and associations against.
//!
//! A [`Model`] can be built by hand or introspected from a live connection
//! (`information_schema` plus `pg_catalog`); introspection derives a to-one
//! association on the referencing side and a to-many association on the
//! referenced side for every foreign key it finds.

use std::collections::HashMap;

use tokio_postgres::Client;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct Model {
    entities: HashMap<String, Entity>,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub schema: Option<String>,
    /// Primary key column names, in ordinal order.
    pub keys: Vec<String>,
    pub columns: Vec<Column>,
    pub associations: HashMap<String, Association>,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// PostgreSQL data type name as reported by the catalog
    /// (e.g. "integer", "numeric", "jsonb").
    pub data_type: String,
}

#[derive(Debug, Clone)]
pub struct Association {
    /// Target entity name.
    pub target: String,
    pub cardinality: Cardinality,
    /// Correlation column pairs: (column on the owning entity, column on
    /// the target entity).
    pub fk: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Entity lookup that fails compilation instead of returning `None`.
    pub fn expect_entity(&self, name: &str) -> Result<&Entity> {
        self.entity(name)
            .ok_or_else(|| Error::Compile(format!("unknown entity `{}`", name)))
    }

    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(String::as_str).collect()
    }

    /// Load a model from a live connection, one entity per table in the
    /// given schema.
    pub async fn introspect(client: &Client, schema: &str) -> Result<Self> {
        let mut model = Model::new();

        let tables = client
            .query(
                r#"
                SELECT c.relname AS name
                FROM pg_catalog.pg_class c
                JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
                WHERE n.nspname = $1
                  AND c.relkind IN ('r', 'v', 'm', 'f')
                ORDER BY c.relname
                "#,
                &[&schema],
            )
            .await
            .map_err(Error::execution)?;

        for table_row in &tables {
            let table: String = table_row.get("name");
            let columns = client
                .query(
                    r#"
                    SELECT
                        c.column_name AS name,
                        c.data_type,
                        COALESCE(tc.constraint_type = 'PRIMARY KEY', false) AS is_primary_key
                    FROM information_schema.columns c
                    LEFT JOIN information_schema.key_column_usage kcu
                        ON c.table_schema = kcu.table_schema
                        AND c.table_name = kcu.table_name
                        AND c.column_name = kcu.column_name
                    LEFT JOIN information_schema.table_constraints tc
                        ON kcu.constraint_name = tc.constraint_name
                        AND kcu.table_schema = tc.table_schema
                        AND tc.constraint_type = 'PRIMARY KEY'
                    WHERE c.table_schema = $1 AND c.table_name = $2
                    ORDER BY c.ordinal_position
                    "#,
                    &[&schema, &table],
                )
                .await
                .map_err(Error::execution)?;

            let mut entity = Entity {
                name: table.clone(),
                schema: Some(schema.to_string()),
                keys: Vec::new(),
                columns: Vec::new(),
                associations: HashMap::new(),
            };
            for row in &columns {
                let name: String = row.get("name");
                let is_pk: bool = row.get("is_primary_key");
                if is_pk {
                    entity.keys.push(name.clone());
                }
                entity.columns.push(Column {
                    name,
                    data_type: row.get("data_type"),
                });
            }
            model.add_entity(entity);
        }

        // Foreign keys: the referencing table gets a to-one association
        // named after the referenced table, the referenced table gets the
        // reverse to-many named after the referencing table.
        let fks = client
            .query(
                r#"
                SELECT
                    tc.table_name,
                    kcu.column_name,
                    ccu.table_name AS foreign_table,
                    ccu.column_name AS foreign_column
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                JOIN information_schema.constraint_column_usage ccu
                    ON tc.constraint_name = ccu.constraint_name
                    AND tc.table_schema = ccu.table_schema
                WHERE tc.constraint_type = 'FOREIGN KEY'
                  AND tc.table_schema = $1
                ORDER BY tc.table_name, kcu.ordinal_position
                "#,
                &[&schema],
            )
            .await
            .map_err(Error::execution)?;

        for row in &fks {
            let table: String = row.get("table_name");
            let column: String = row.get("column_name");
            let foreign_table: String = row.get("foreign_table");
            let foreign_column: String = row.get("foreign_column");

            if let Some(entity) = model.entities.get_mut(&table) {
                entity
                    .associations
                    .entry(foreign_table.clone())
                    .or_insert_with(|| Association {
                        target: foreign_table.clone(),
                        cardinality: Cardinality::One,
                        fk: Vec::new(),
                    })
                    .fk
                    .push((column.clone(), foreign_column.clone()));
            }
            if let Some(entity) = model.entities.get_mut(&foreign_table) {
                entity
                    .associations
                    .entry(table.clone())
                    .or_insert_with(|| Association {
                        target: table.clone(),
                        cardinality: Cardinality::Many,
                        fk: Vec::new(),
                    })
                    .fk
                    .push((foreign_column, column));
            }
        }

        Ok(model)
    }
}

impl Entity {
    pub fn association(&self, name: &str) -> Result<&Association> {
        self.associations.get(name).ok_or_else(|| {
            Error::Compile(format!(
                "entity `{}` has no association `{}`",
                self.name, name
            ))
        })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// users (id pk) 1─* orders (id pk, user_id fk) 1─* items
    /// (id pk, order_id fk); orders also points back to-one at users.
    pub fn shop_model() -> Model {
        let mut model = Model::new();

        let mut users = Entity {
            name: "users".into(),
            schema: Some("public".into()),
            keys: vec!["id".into()],
            columns: vec![
                Column {
                    name: "id".into(),
                    data_type: "integer".into(),
                },
                Column {
                    name: "name".into(),
                    data_type: "text".into(),
                },
                Column {
                    name: "balance".into(),
                    data_type: "numeric".into(),
                },
            ],
            associations: HashMap::new(),
        };
        users.associations.insert(
            "orders".into(),
            Association {
                target: "orders".into(),
                cardinality: Cardinality::Many,
                fk: vec![("id".into(), "user_id".into())],
            },
        );

        let mut orders = Entity {
            name: "orders".into(),
            schema: Some("public".into()),
            keys: vec!["id".into()],
            columns: vec![
                Column {
                    name: "id".into(),
                    data_type: "integer".into(),
                },
                Column {
                    name: "user_id".into(),
                    data_type: "integer".into(),
                },
                Column {
                    name: "total".into(),
                    data_type: "numeric".into(),
                },
                Column {
                    name: "meta".into(),
                    data_type: "jsonb".into(),
                },
            ],
            associations: HashMap::new(),
        };
        orders.associations.insert(
            "items".into(),
            Association {
                target: "items".into(),
                cardinality: Cardinality::Many,
                fk: vec![("id".into(), "order_id".into())],
            },
        );
        orders.associations.insert(
            "users".into(),
            Association {
                target: "users".into(),
                cardinality: Cardinality::One,
                fk: vec![("user_id".into(), "id".into())],
            },
        );

        let items = Entity {
            name: "items".into(),
            schema: Some("public".into()),
            keys: vec!["id".into()],
            columns: vec![
                Column {
                    name: "id".into(),
                    data_type: "integer".into(),
                },
                Column {
                    name: "order_id".into(),
                    data_type: "integer".into(),
                },
                Column {
                    name: "sku".into(),
                    data_type: "text".into(),
                },
            ],
            associations: HashMap::new(),
        };

        model.add_entity(users);
        model.add_entity(orders);
        model.add_entity(items);
        model
    }
}
