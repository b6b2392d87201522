//! Owner entity: the party a device is assigned to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::Entity;
use crate::schema::{EntitySchema, FieldDef, FieldKind, FieldType};

pub static OWNER_SCHEMA: EntitySchema = EntitySchema {
    table: "owners",
    id_column: "id",
    select_list: "owners.id, owners.name, owners.email, owners.created_at",
    insert_columns: &["id", "name", "email", "created_at"],
    conflict_update: "name = EXCLUDED.name, email = EXCLUDED.email",
    fields: &[
        FieldDef {
            name: "id",
            kind: FieldKind::Column {
                expr: "owners.id",
                ty: FieldType::Uuid,
            },
        },
        FieldDef {
            name: "name",
            kind: FieldKind::Column {
                expr: "owners.name",
                ty: FieldType::Text,
            },
        },
        FieldDef {
            name: "email",
            kind: FieldKind::Column {
                expr: "owners.email",
                ty: FieldType::Text,
            },
        },
        FieldDef {
            name: "created_at",
            kind: FieldKind::Column {
                expr: "owners.created_at",
                ty: FieldType::Timestamp,
            },
        },
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOwner {
    pub name: String,
    pub email: String,
}

impl Owner {
    pub fn create(input: NewOwner) -> Self {
        Self::with_id(Uuid::new_v4(), input)
    }

    pub fn with_id(id: Uuid, input: NewOwner) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Owner {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut values = qb.separated(", ");
        values.push_bind(self.id);
        values.push_bind(self.name.clone());
        values.push_bind(self.email.clone());
        values.push_bind(self.created_at);
    }
}
