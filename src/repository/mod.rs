//! Repository layer for database operations.
//!
//! [`Repository`] is generic over any [`Entity`]: it is handed a pool
//! and the entity's static [`EntitySchema`] at construction and builds
//! every statement dynamically from them. Filter values, limits and
//! offsets are always bound as statement parameters, never spliced
//! into the SQL text.

pub mod devices;
pub mod owners;

pub use devices::{Device, NewDevice, DEVICE_SCHEMA};
pub use owners::{NewOwner, Owner, OWNER_SCHEMA};

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::RepositoryError;
use crate::schema::{resolve_path, EntitySchema, FieldType};

/// Sort direction; ascending unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ordering instruction; entry order is precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: Direction,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// Equality constraints, AND-conjoined. Field paths may be dotted to
/// address a related entity's column (`owner.name`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    entries: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(path, value);
        self
    }

    pub fn push(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.entries.push((path.into(), value.into()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Result window. A lone offset or lone limit means "no pagination
/// requested"; both must be present for a bound to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Page {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn bounded(offset: i64, limit: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn bounds(self) -> Option<(i64, i64)> {
        match (self.offset, self.limit) {
            (Some(offset), Some(limit)) => Some((offset, limit)),
            _ => None,
        }
    }
}

/// A persistable record with a scalar identity.
///
/// Implementations pair a row type with its [`EntitySchema`]; the
/// repository takes both explicitly, there is no runtime discovery.
pub trait Entity:
    for<'r> sqlx::FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    type Id: for<'q> sqlx::Encode<'q, Postgres>
        + sqlx::Type<Postgres>
        + Clone
        + Send
        + Sync
        + 'static;

    fn id(&self) -> Self::Id;

    /// Push one bind per `EntitySchema::insert_columns` entry, in the
    /// same order.
    fn bind_insert(&self, qb: &mut QueryBuilder<'static, Postgres>);
}

#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

fn parse_bind_value(path: &str, ty: FieldType, raw: &str) -> Result<BindValue, RepositoryError> {
    let invalid = || RepositoryError::InvalidValue {
        path: path.to_string(),
        value: raw.to_string(),
    };
    let value = match ty {
        FieldType::Text => BindValue::Text(raw.to_string()),
        FieldType::Integer => BindValue::Integer(raw.parse().map_err(|_| invalid())?),
        FieldType::Float => BindValue::Float(raw.parse().map_err(|_| invalid())?),
        FieldType::Boolean => BindValue::Boolean(raw.parse().map_err(|_| invalid())?),
        FieldType::Uuid => BindValue::Uuid(Uuid::parse_str(raw).map_err(|_| invalid())?),
        FieldType::Timestamp => BindValue::Timestamp(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| invalid())?
                .with_timezone(&Utc),
        ),
    };
    Ok(value)
}

fn push_bind_value(qb: &mut QueryBuilder<'static, Postgres>, value: &BindValue) {
    match value {
        BindValue::Text(v) => qb.push_bind(v.clone()),
        BindValue::Integer(v) => qb.push_bind(*v),
        BindValue::Float(v) => qb.push_bind(*v),
        BindValue::Boolean(v) => qb.push_bind(*v),
        BindValue::Uuid(v) => qb.push_bind(*v),
        BindValue::Timestamp(v) => qb.push_bind(*v),
    };
}

/// Everything resolved against the schema before any SQL is assembled,
/// so unknown paths and unparsable values fail before a statement
/// exists.
struct QueryPlan {
    joins: Vec<&'static str>,
    predicates: Vec<(&'static str, BindValue)>,
    order: Vec<(&'static str, Direction)>,
    bounds: Option<(i64, i64)>,
    tiebreak: Option<String>,
}

impl QueryPlan {
    fn build(
        schema: &'static EntitySchema,
        filter: &Filter,
        sort: &[SortSpec],
        page: Page,
    ) -> Result<Self, RepositoryError> {
        let mut joins: Vec<&'static str> = Vec::new();
        let mut predicates = Vec::new();
        for (path, raw) in filter.entries() {
            let resolved = resolve_path(schema, path)?;
            let value = parse_bind_value(path, resolved.ty, raw)?;
            for join in resolved.joins {
                if !joins.contains(&join) {
                    joins.push(join);
                }
            }
            predicates.push((resolved.expr, value));
        }

        let mut order = Vec::new();
        for spec in sort {
            let resolved = resolve_path(schema, &spec.field)?;
            for join in resolved.joins {
                if !joins.contains(&join) {
                    joins.push(join);
                }
            }
            order.push((resolved.expr, spec.direction));
        }

        // LIMIT/OFFSET over an unordered set is not a stable window;
        // the id column breaks ties whenever a page is requested.
        let bounds = page.bounds();
        let tiebreak = match bounds {
            Some(_) => {
                let id_expr = schema.qualified_id();
                if order.iter().any(|(expr, _)| *expr == id_expr) {
                    None
                } else {
                    Some(id_expr)
                }
            }
            None => None,
        };

        Ok(Self {
            joins,
            predicates,
            order,
            bounds,
            tiebreak,
        })
    }

    fn push_from(&self, qb: &mut QueryBuilder<'static, Postgres>, table: &'static str) {
        qb.push(" FROM ");
        qb.push(table);
        for join in &self.joins {
            qb.push(" ");
            qb.push(*join);
        }
        qb.push(" WHERE 1=1");
        for (expr, value) in &self.predicates {
            qb.push(" AND ");
            qb.push(*expr);
            qb.push(" = ");
            push_bind_value(qb, value);
        }
    }

    fn push_order(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        if self.order.is_empty() && self.tiebreak.is_none() {
            return;
        }
        qb.push(" ORDER BY ");
        let mut first = true;
        for (expr, direction) in &self.order {
            if !first {
                qb.push(", ");
            }
            qb.push(*expr);
            qb.push(" ");
            qb.push(direction.as_sql());
            first = false;
        }
        if let Some(id_expr) = &self.tiebreak {
            if !first {
                qb.push(", ");
            }
            qb.push(id_expr.clone());
            qb.push(" ASC");
        }
    }

    fn push_bounds(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        if let Some((offset, limit)) = self.bounds {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }
    }
}

fn build_find_query(
    schema: &'static EntitySchema,
    filter: &Filter,
    sort: &[SortSpec],
    page: Page,
) -> Result<QueryBuilder<'static, Postgres>, RepositoryError> {
    let plan = QueryPlan::build(schema, filter, sort, page)?;
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(schema.select_list);
    plan.push_from(&mut qb, schema.table);
    plan.push_order(&mut qb);
    plan.push_bounds(&mut qb);
    Ok(qb)
}

fn build_count_query(
    schema: &'static EntitySchema,
    filter: &Filter,
    page: Page,
) -> Result<QueryBuilder<'static, Postgres>, RepositoryError> {
    let plan = QueryPlan::build(schema, filter, &[], page)?;
    let mut qb;
    if plan.bounds.is_some() {
        // a bounded count is the count of the window, not of the
        // whole match set
        qb = QueryBuilder::new("SELECT COUNT(*) FROM (SELECT 1 AS one");
        plan.push_from(&mut qb, schema.table);
        plan.push_bounds(&mut qb);
        qb.push(") AS page_rows");
    } else {
        qb = QueryBuilder::new("SELECT COUNT(*)");
        plan.push_from(&mut qb, schema.table);
    }
    Ok(qb)
}

pub struct Repository<E> {
    pool: PgPool,
    schema: &'static EntitySchema,
    _entity: PhantomData<E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: PgPool, schema: &'static EntitySchema) -> Self {
        Self {
            pool,
            schema,
            _entity: PhantomData,
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Point lookup by identity; `None` when no row matches.
    pub async fn load(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.schema.select_list,
            self.schema.table,
            self.schema.qualified_id()
        );
        let entity = sqlx::query_as::<_, E>(&sql)
            .bind(id.clone())
            .fetch_optional(&self.pool)
            .await?;
        Ok(entity)
    }

    pub async fn persist(&self, entity: &E) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            self.schema.table,
            self.schema.insert_columns.join(", ")
        ));
        entity.bind_insert(&mut qb);
        qb.push(")");
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    /// Upsert: insert, or update the existing row on identity
    /// conflict. Returns the stored row.
    pub async fn merge(&self, entity: &E) -> Result<E, RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            self.schema.table,
            self.schema.insert_columns.join(", ")
        ));
        entity.bind_insert(&mut qb);
        qb.push(") ON CONFLICT (");
        qb.push(self.schema.id_column);
        qb.push(") DO UPDATE SET ");
        qb.push(self.schema.conflict_update);
        qb.push(" RETURNING ");
        qb.push(self.schema.select_list);
        let merged = qb.build_query_as::<E>().fetch_one(&self.pool).await?;
        Ok(merged)
    }

    /// Delete by identity. A missing id is a no-op, not an error.
    pub async fn remove(&self, id: &E::Id) -> Result<(), RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            self.schema.table, self.schema.id_column
        );
        let result = sqlx::query(&sql)
            .bind(id.clone())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(table = %self.schema.table, "remove matched no row");
        }
        Ok(())
    }

    pub async fn find_all(&self) -> Result<Vec<E>, RepositoryError> {
        self.find_with(&Filter::default(), &[], Page::none()).await
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<E>, RepositoryError> {
        self.find_with(filter, &[], Page::none()).await
    }

    pub async fn find_page(&self, filter: &Filter, page: Page) -> Result<Vec<E>, RepositoryError> {
        self.find_with(filter, &[], page).await
    }

    /// The full shape; the other find methods delegate here.
    pub async fn find_with(
        &self,
        filter: &Filter,
        sort: &[SortSpec],
        page: Page,
    ) -> Result<Vec<E>, RepositoryError> {
        let mut qb = build_find_query(self.schema, filter, sort, page)?;
        let rows = qb.build_query_as::<E>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        self.count_page(&Filter::default(), Page::none()).await
    }

    pub async fn count(&self, filter: &Filter) -> Result<i64, RepositoryError> {
        self.count_page(filter, Page::none()).await
    }

    /// Count with an optional window; unbounded, this is the total of
    /// the match set.
    pub async fn count_page(&self, filter: &Filter, page: Page) -> Result<i64, RepositoryError> {
        let mut qb = build_count_query(self.schema, filter, page)?;
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unfiltered_find_selects_everything() {
        let qb = build_find_query(&DEVICE_SCHEMA, &Filter::default(), &[], Page::none()).unwrap();
        let sql = qb.sql();
        assert_eq!(
            sql,
            "SELECT devices.id, devices.label, devices.serial, devices.status, \
             devices.owner_id, devices.created_at FROM devices WHERE 1=1"
        );
    }

    #[test]
    fn filter_values_are_bound_not_inlined() {
        let filter = Filter::new().eq("status", "active").eq("owner.name", "Ada");
        let qb = build_find_query(&DEVICE_SCHEMA, &filter, &[], Page::none()).unwrap();
        let sql = qb.sql();
        assert!(sql.contains("LEFT JOIN owners ON owners.id = devices.owner_id"));
        assert!(sql.contains("AND devices.status = $1"));
        assert!(sql.contains("AND owners.name = $2"));
        assert!(!sql.contains("active"), "values must be bound, not spliced");
        assert!(!sql.contains("Ada"), "values must be bound, not spliced");
    }

    #[test]
    fn duplicate_joins_are_collapsed() {
        let filter = Filter::new().eq("owner.name", "Ada").eq("owner.email", "a@b");
        let qb = build_find_query(&DEVICE_SCHEMA, &filter, &[], Page::none()).unwrap();
        let sql = qb.sql();
        assert_eq!(sql.matches("LEFT JOIN owners").count(), 1);
    }

    #[test]
    fn sort_precedence_is_preserved() {
        let sort = vec![SortSpec::desc("created_at"), SortSpec::asc("label")];
        let qb = build_find_query(&DEVICE_SCHEMA, &Filter::default(), &sort, Page::none()).unwrap();
        let sql = qb.sql();
        assert!(sql.ends_with("ORDER BY devices.created_at DESC, devices.label ASC"));
    }

    #[test]
    fn dotted_sort_pulls_in_join() {
        let sort = vec![SortSpec::asc("owner.name")];
        let qb = build_find_query(&DEVICE_SCHEMA, &Filter::default(), &sort, Page::none()).unwrap();
        let sql = qb.sql();
        assert!(sql.contains("LEFT JOIN owners"));
        assert!(sql.contains("ORDER BY owners.name ASC"));
    }

    #[test]
    fn pagination_binds_limit_and_offset() {
        let qb = build_find_query(
            &DEVICE_SCHEMA,
            &Filter::default(),
            &[],
            Page::bounded(10, 5),
        )
        .unwrap();
        let sql = qb.sql();
        assert!(sql.contains(" LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn pagination_gets_a_stable_tiebreak() {
        let sort = vec![SortSpec::asc("label")];
        let qb =
            build_find_query(&DEVICE_SCHEMA, &Filter::default(), &sort, Page::bounded(0, 10))
                .unwrap();
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY devices.label ASC, devices.id ASC"));
    }

    #[test]
    fn id_sort_is_not_doubled_as_tiebreak() {
        let sort = vec![SortSpec::desc("id")];
        let qb =
            build_find_query(&DEVICE_SCHEMA, &Filter::default(), &sort, Page::bounded(0, 10))
                .unwrap();
        let sql = qb.sql();
        assert_eq!(sql.matches("devices.id").count(), 2); // select list + sort
        assert!(sql.contains("ORDER BY devices.id DESC LIMIT"));
    }

    #[test]
    fn lone_offset_does_not_paginate() {
        let page = Page {
            offset: Some(10),
            limit: None,
        };
        let qb = build_find_query(&DEVICE_SCHEMA, &Filter::default(), &[], page).unwrap();
        let sql = qb.sql();
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn unknown_filter_field_fails_fast() {
        let filter = Filter::new().eq("bogus", "1");
        let err = build_find_query(&DEVICE_SCHEMA, &filter, &[], Page::none())
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::UnknownField { .. }));
    }

    #[test]
    fn unknown_sort_field_fails_fast() {
        let sort = vec![SortSpec::asc("bogus")];
        let err = build_find_query(&DEVICE_SCHEMA, &Filter::default(), &sort, Page::none())
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::UnknownField { .. }));
    }

    #[test]
    fn unparsable_filter_value_fails_fast() {
        let filter = Filter::new().eq("owner_id", "not-a-uuid");
        let err = build_find_query(&DEVICE_SCHEMA, &filter, &[], Page::none())
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::InvalidValue { .. }));
    }

    #[test]
    fn typed_values_parse_per_field_type() {
        assert_eq!(
            parse_bind_value("n", FieldType::Integer, "42").unwrap(),
            BindValue::Integer(42)
        );
        assert_eq!(
            parse_bind_value("b", FieldType::Boolean, "true").unwrap(),
            BindValue::Boolean(true)
        );
        assert!(parse_bind_value("n", FieldType::Integer, "4.2").is_err());
        assert!(parse_bind_value("t", FieldType::Timestamp, "yesterday").is_err());
        assert!(
            parse_bind_value("t", FieldType::Timestamp, "2026-08-07T12:00:00Z").is_ok()
        );
    }

    #[test]
    fn unbounded_count_counts_the_match_set() {
        let qb = build_count_query(&DEVICE_SCHEMA, &Filter::default(), Page::none()).unwrap();
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM devices WHERE 1=1");
    }

    #[test]
    fn bounded_count_counts_the_window() {
        let qb =
            build_count_query(&DEVICE_SCHEMA, &Filter::default(), Page::bounded(10, 5)).unwrap();
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT COUNT(*) FROM (SELECT 1 AS one"));
        assert!(sql.ends_with(") AS page_rows"));
        assert!(sql.contains("LIMIT $1 OFFSET $2"));
    }
}
