use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "audit_log_id")]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub identity_id: Option<Uuid>,
    pub username: Option<String>,
    pub event_type_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub event_params: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
