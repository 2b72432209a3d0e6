use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};

use jobspace_auth_schema::{companies, reset_codes, students};
use jobspace_domain::principal::PrincipalKind;

use crate::domain::repository::{PrincipalRepository, ResetCodeRepository};
use crate::domain::types::{DeliveryMethod, NewResetCode, Principal, ResetCode};
use crate::error::AuthServiceError;

// ── Principal repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPrincipalRepository {
    pub db: DatabaseConnection,
}

impl PrincipalRepository for DbPrincipalRepository {
    async fn find_active_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> Result<Option<Principal>, AuthServiceError> {
        match kind {
            PrincipalKind::Student => {
                let model = students::Entity::find()
                    .filter(students::Column::Email.eq(email))
                    .filter(students::Column::IsActive.eq(true))
                    .one(&self.db)
                    .await
                    .context("find active student by email")?;
                Ok(model.map(principal_from_student))
            }
            PrincipalKind::Company => {
                let model = companies::Entity::find()
                    .filter(companies::Column::Email.eq(email))
                    .filter(companies::Column::IsActive.eq(true))
                    .one(&self.db)
                    .await
                    .context("find active company by email")?;
                Ok(model.map(principal_from_company))
            }
        }
    }

    async fn find_active_by_phone(
        &self,
        kind: PrincipalKind,
        phone: &str,
    ) -> Result<Option<Principal>, AuthServiceError> {
        match kind {
            PrincipalKind::Student => {
                let model = students::Entity::find()
                    .filter(students::Column::Phone.eq(phone))
                    .filter(students::Column::IsActive.eq(true))
                    .one(&self.db)
                    .await
                    .context("find active student by phone")?;
                Ok(model.map(principal_from_student))
            }
            PrincipalKind::Company => {
                let model = companies::Entity::find()
                    .filter(companies::Column::Phone.eq(phone))
                    .filter(companies::Column::IsActive.eq(true))
                    .one(&self.db)
                    .await
                    .context("find active company by phone")?;
                Ok(model.map(principal_from_company))
            }
        }
    }

    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: i32,
    ) -> Result<Option<Principal>, AuthServiceError> {
        match kind {
            PrincipalKind::Student => {
                let model = students::Entity::find_by_id(id)
                    .one(&self.db)
                    .await
                    .context("find student by id")?;
                Ok(model.map(principal_from_student))
            }
            PrincipalKind::Company => {
                let model = companies::Entity::find_by_id(id)
                    .one(&self.db)
                    .await
                    .context("find company by id")?;
                Ok(model.map(principal_from_company))
            }
        }
    }
}

fn principal_from_student(model: students::Model) -> Principal {
    Principal {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        password_hash: model.password_hash,
        kind: PrincipalKind::Student,
        is_active: model.is_active,
    }
}

fn principal_from_company(model: companies::Model) -> Principal {
    Principal {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        password_hash: model.password_hash,
        kind: PrincipalKind::Company,
        is_active: model.is_active,
    }
}

// ── Reset-code repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbResetCodeRepository {
    pub db: DatabaseConnection,
}

impl ResetCodeRepository for DbResetCodeRepository {
    async fn replace_active(&self, new: &NewResetCode) -> Result<ResetCode, AuthServiceError> {
        let model = self
            .db
            .transaction::<_, reset_codes::Model, sea_orm::DbErr>(|txn| {
                let new = new.clone();
                Box::pin(async move {
                    let mut invalidate = reset_codes::Entity::update_many()
                        .col_expr(reset_codes::Column::IsUsed, Expr::value(true))
                        .filter(reset_codes::Column::Method.eq(new.method.as_str()))
                        .filter(
                            reset_codes::Column::PrincipalKind.eq(new.principal_kind.as_str()),
                        )
                        .filter(reset_codes::Column::IsUsed.eq(false));
                    invalidate = match new.method {
                        DeliveryMethod::Email => {
                            invalidate.filter(reset_codes::Column::Email.eq(new.email.clone()))
                        }
                        DeliveryMethod::Sms => {
                            invalidate.filter(reset_codes::Column::Phone.eq(new.phone.clone()))
                        }
                    };
                    invalidate.exec(txn).await?;

                    reset_codes::ActiveModel {
                        code: Set(new.code.clone()),
                        email: Set(new.email.clone()),
                        phone: Set(new.phone.clone()),
                        method: Set(new.method.as_str().to_owned()),
                        principal_kind: Set(new.principal_kind.as_str().to_owned()),
                        is_used: Set(false),
                        verification_token: Set(None),
                        expires_at: Set(new.expires_at),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                })
            })
            .await
            .context("replace active reset codes")?;

        reset_code_from_model(model)
    }

    async fn find_valid(
        &self,
        code: &str,
        method: DeliveryMethod,
        kind: PrincipalKind,
        channel_value: &str,
    ) -> Result<Option<ResetCode>, AuthServiceError> {
        let now = Utc::now();
        let mut query = reset_codes::Entity::find()
            .filter(reset_codes::Column::Code.eq(code))
            .filter(reset_codes::Column::Method.eq(method.as_str()))
            .filter(reset_codes::Column::PrincipalKind.eq(kind.as_str()))
            .filter(reset_codes::Column::IsUsed.eq(false))
            .filter(reset_codes::Column::ExpiresAt.gt(now));
        query = match method {
            DeliveryMethod::Email => query.filter(reset_codes::Column::Email.eq(channel_value)),
            DeliveryMethod::Sms => query.filter(reset_codes::Column::Phone.eq(channel_value)),
        };

        let model = query
            .one(&self.db)
            .await
            .context("find valid reset code")?;
        model.map(reset_code_from_model).transpose()
    }

    async fn claim(&self, id: i32, verification_token: &str) -> Result<bool, AuthServiceError> {
        // Conditional update: the is_used predicate makes concurrent claims
        // race on rows_affected, so exactly one caller sees 1.
        let now = Utc::now();
        let result = reset_codes::Entity::update_many()
            .col_expr(reset_codes::Column::IsUsed, Expr::value(true))
            .col_expr(
                reset_codes::Column::VerificationToken,
                Expr::value(verification_token),
            )
            .filter(reset_codes::Column::Id.eq(id))
            .filter(reset_codes::Column::IsUsed.eq(false))
            .filter(reset_codes::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("claim reset code")?;
        Ok(result.rows_affected == 1)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ResetCode>, AuthServiceError> {
        let now = Utc::now();
        let model = reset_codes::Entity::find()
            .filter(reset_codes::Column::VerificationToken.eq(token))
            .filter(reset_codes::Column::IsUsed.eq(true))
            .filter(reset_codes::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find reset code by verification token")?;
        model.map(reset_code_from_model).transpose()
    }

    async fn consume_and_set_password(
        &self,
        code_id: i32,
        kind: PrincipalKind,
        principal_id: i32,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        let hash = password_hash.to_owned();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    match kind {
                        PrincipalKind::Student => {
                            students::ActiveModel {
                                id: Set(principal_id),
                                password_hash: Set(hash),
                                ..Default::default()
                            }
                            .update(txn)
                            .await?;
                        }
                        PrincipalKind::Company => {
                            companies::ActiveModel {
                                id: Set(principal_id),
                                password_hash: Set(hash),
                                ..Default::default()
                            }
                            .update(txn)
                            .await?;
                        }
                    }
                    reset_codes::Entity::delete_by_id(code_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("set password and consume reset code")?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, AuthServiceError> {
        let result = reset_codes::Entity::delete_many()
            .filter(reset_codes::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.db)
            .await
            .context("delete expired reset codes")?;
        Ok(result.rows_affected)
    }
}

fn reset_code_from_model(model: reset_codes::Model) -> Result<ResetCode, AuthServiceError> {
    let method = DeliveryMethod::from_str(&model.method)
        .ok_or_else(|| anyhow::anyhow!("unknown delivery method {:?} in row {}", model.method, model.id))?;
    let principal_kind = PrincipalKind::from_str(&model.principal_kind).ok_or_else(|| {
        anyhow::anyhow!("unknown principal kind {:?} in row {}", model.principal_kind, model.id)
    })?;
    Ok(ResetCode {
        id: model.id,
        code: model.code,
        email: model.email,
        phone: model.phone,
        method,
        principal_kind,
        is_used: model.is_used,
        verification_token: model.verification_token,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}
