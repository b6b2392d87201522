//! Device entity: a tracked unit, optionally assigned to an owner.
//!
//! The `owner` relation makes `owner.name` and `owner.email` valid
//! dotted filter/sort paths on device queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::owners::OWNER_SCHEMA;
use super::Entity;
use crate::schema::{EntitySchema, FieldDef, FieldKind, FieldType};

pub static DEVICE_SCHEMA: EntitySchema = EntitySchema {
    table: "devices",
    id_column: "id",
    select_list: "devices.id, devices.label, devices.serial, devices.status, \
                  devices.owner_id, devices.created_at",
    insert_columns: &["id", "label", "serial", "status", "owner_id", "created_at"],
    conflict_update: "label = EXCLUDED.label, serial = EXCLUDED.serial, \
                      status = EXCLUDED.status, owner_id = EXCLUDED.owner_id",
    fields: &[
        FieldDef {
            name: "id",
            kind: FieldKind::Column {
                expr: "devices.id",
                ty: FieldType::Uuid,
            },
        },
        FieldDef {
            name: "label",
            kind: FieldKind::Column {
                expr: "devices.label",
                ty: FieldType::Text,
            },
        },
        FieldDef {
            name: "serial",
            kind: FieldKind::Column {
                expr: "devices.serial",
                ty: FieldType::Text,
            },
        },
        FieldDef {
            name: "status",
            kind: FieldKind::Column {
                expr: "devices.status",
                ty: FieldType::Text,
            },
        },
        FieldDef {
            name: "owner_id",
            kind: FieldKind::Column {
                expr: "devices.owner_id",
                ty: FieldType::Uuid,
            },
        },
        FieldDef {
            name: "created_at",
            kind: FieldKind::Column {
                expr: "devices.created_at",
                ty: FieldType::Timestamp,
            },
        },
        FieldDef {
            name: "owner",
            kind: FieldKind::Relation {
                join: "LEFT JOIN owners ON owners.id = devices.owner_id",
                schema: &OWNER_SCHEMA,
            },
        },
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: Uuid,
    pub label: String,
    pub serial: String,
    pub status: String,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDevice {
    pub label: String,
    pub serial: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub owner_id: Option<Uuid>,
}

fn default_status() -> String {
    "inactive".to_string()
}

impl Device {
    pub fn create(input: NewDevice) -> Self {
        Self::with_id(Uuid::new_v4(), input)
    }

    pub fn with_id(id: Uuid, input: NewDevice) -> Self {
        Self {
            id,
            label: input.label,
            serial: input.serial,
            status: input.status,
            owner_id: input.owner_id,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Device {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut values = qb.separated(", ");
        values.push_bind(self.id);
        values.push_bind(self.label.clone());
        values.push_bind(self.serial.clone());
        values.push_bind(self.status.clone());
        values.push_bind(self.owner_id);
        values.push_bind(self.created_at);
    }
}
