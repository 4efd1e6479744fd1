//! `SeaORM` Entity for the legacy referrer-entries table.
//!
//! Optional table; rows link a referring client directly to a referred
//! client without going through the affiliate record.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "affiliate_referrer_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub referrer_client_id: i32,
    pub referred_client_id: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
