use sea_orm::entity::prelude::*;

/// One in-flight password-recovery attempt.
///
/// Carries either `email` or `phone` depending on `method`. No foreign key:
/// the owning row lives in `students` or `companies`, selected by
/// `principal_kind`. Expires 15 minutes after creation; expired rows are
/// swept by the periodic cleanup task.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reset_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub method: String,
    pub principal_kind: String,
    pub is_used: bool,
    pub verification_token: Option<String>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
