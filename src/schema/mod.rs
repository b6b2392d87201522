//! Static entity descriptors.
//!
//! Each entity declares an [`EntitySchema`]: its table, column list and
//! a field table mapping public field names to SQL column expressions.
//! Related entities are reachable through [`FieldKind::Relation`]
//! entries, so a dotted path like `owner.name` resolves by walking the
//! field tables segment by segment. Anything the tables do not declare
//! is an unknown field, reported before any SQL is built.

use crate::errors::RepositoryError;

/// Declared type of a filterable column. Filter values arrive as
/// strings and are parsed into this type before being bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    Timestamp,
}

#[derive(Debug)]
pub struct EntitySchema {
    /// Table name, also used to qualify column references.
    pub table: &'static str,
    /// Identity column, unqualified.
    pub id_column: &'static str,
    /// Qualified column list shared by every SELECT and RETURNING.
    pub select_list: &'static str,
    /// Insert column order; `Entity::bind_insert` must push one bind
    /// per entry, in the same order.
    pub insert_columns: &'static [&'static str],
    /// Assignment list for the upsert's DO UPDATE branch.
    pub conflict_update: &'static str,
    pub fields: &'static [FieldDef],
}

#[derive(Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub enum FieldKind {
    Column {
        expr: &'static str,
        ty: FieldType,
    },
    Relation {
        join: &'static str,
        schema: &'static EntitySchema,
    },
}

/// A field path resolved to a concrete column expression plus the JOIN
/// clauses needed to reach it.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub expr: &'static str,
    pub ty: FieldType,
    pub joins: Vec<&'static str>,
}

impl EntitySchema {
    pub fn qualified_id(&self) -> String {
        format!("{}.{}", self.table, self.id_column)
    }
}

/// Walk a dotted field path through the schema tables.
///
/// Intermediate segments must name relations, the final segment must
/// name a column; every other shape is an unknown field.
pub fn resolve_path(
    root: &'static EntitySchema,
    path: &str,
) -> Result<ResolvedField, RepositoryError> {
    let unknown = || RepositoryError::UnknownField {
        path: path.to_string(),
    };

    let mut schema = root;
    let mut joins: Vec<&'static str> = Vec::new();
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let field = schema
            .fields
            .iter()
            .find(|f| f.name == segment)
            .ok_or_else(unknown)?;

        match &field.kind {
            FieldKind::Column { expr, ty } => {
                if segments.peek().is_some() {
                    // path continues past a scalar column
                    return Err(unknown());
                }
                return Ok(ResolvedField {
                    expr: *expr,
                    ty: *ty,
                    joins,
                });
            }
            FieldKind::Relation { join, schema: related } => {
                if segments.peek().is_none() {
                    // a relation is not addressable on its own
                    return Err(unknown());
                }
                if !joins.contains(join) {
                    joins.push(*join);
                }
                schema = *related;
            }
        }
    }

    Err(unknown())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::devices::DEVICE_SCHEMA;

    #[test]
    fn resolves_plain_column() {
        let resolved = resolve_path(&DEVICE_SCHEMA, "label").unwrap();
        assert_eq!(resolved.expr, "devices.label");
        assert_eq!(resolved.ty, FieldType::Text);
        assert!(resolved.joins.is_empty());
    }

    #[test]
    fn resolves_dotted_path_with_join() {
        let resolved = resolve_path(&DEVICE_SCHEMA, "owner.name").unwrap();
        assert_eq!(resolved.expr, "owners.name");
        assert_eq!(resolved.joins.len(), 1);
        assert!(resolved.joins[0].contains("JOIN owners"));
    }

    #[test]
    fn unknown_head_fails() {
        let err = resolve_path(&DEVICE_SCHEMA, "nonsense").unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownField { .. }));
    }

    #[test]
    fn unknown_leaf_fails() {
        let err = resolve_path(&DEVICE_SCHEMA, "owner.nonsense").unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownField { .. }));
    }

    #[test]
    fn path_through_scalar_column_fails() {
        let err = resolve_path(&DEVICE_SCHEMA, "label.deeper").unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownField { .. }));
    }

    #[test]
    fn bare_relation_fails() {
        let err = resolve_path(&DEVICE_SCHEMA, "owner").unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownField { .. }));
    }
}
