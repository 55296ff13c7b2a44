//! 天级访客计数实体
//!
//! 每个自然日（UTC）一行，`visit_date` 即主键。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "visitor_counts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub visit_date: Date,
    pub visit_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
