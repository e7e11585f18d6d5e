use chrono::{SubsecRound, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

use crate::{
    Currency, EngineError, MAX_DISPLAY_NAME_LEN, ResultEngine, User, goals, transactions, users,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a user, or replace name and currency of an existing one.
    ///
    /// `registered_at` of an existing user is kept and its transactions and
    /// goals are never touched.
    pub async fn upsert_user(
        &self,
        user_id: i64,
        display_name: &str,
        currency: Currency,
    ) -> ResultEngine<()> {
        let display_name = normalize_required_name(display_name, "display", MAX_DISPLAY_NAME_LEN)?;
        let model = users::ActiveModel {
            id: ActiveValue::Set(user_id),
            display_name: ActiveValue::Set(display_name),
            currency: ActiveValue::Set(currency.code().to_string()),
            registered_at: ActiveValue::Set(Utc::now().trunc_subsecs(0)),
        };
        users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .update_columns([users::Column::DisplayName, users::Column::Currency])
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }

    /// Return the user, `None` if they never registered.
    pub async fn user(&self, user_id: i64) -> ResultEngine<Option<User>> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub async fn update_currency(&self, user_id: i64, currency: Currency) -> ResultEngine<()> {
        let res = users::Entity::update_many()
            .col_expr(users::Column::Currency, Expr::value(currency.code()))
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    pub async fn rename_user(&self, user_id: i64, display_name: &str) -> ResultEngine<()> {
        let display_name = normalize_required_name(display_name, "display", MAX_DISPLAY_NAME_LEN)?;
        let res = users::Entity::update_many()
            .col_expr(users::Column::DisplayName, Expr::value(display_name))
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// Delete the user together with their transactions and goals.
    pub async fn remove_user(&self, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            transactions::Entity::delete_many()
                .filter(transactions::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            goals::Entity::delete_many()
                .filter(goals::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            let res = users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            if res.rows_affected == 0 {
                Err(EngineError::KeyNotFound("user not exists".to_string()))
            } else {
                Ok(())
            }
        })
    }

    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i64,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
