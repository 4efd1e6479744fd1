//! `SeaORM` Entity for the custom-field definitions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub field_type: String,
    pub field_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::custom_field_values::Entity")]
    CustomFieldValues,
}

impl Related<super::custom_field_values::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomFieldValues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
