use chrono::{SubsecRound, Utc};
use sea_orm::{ActiveValue, Statement, prelude::*};

use crate::{
    EngineError, MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, Money, NewTransaction, ResultEngine,
    TransactionKind, transactions,
    util::{normalize_optional_text, normalize_required_name},
};

use super::Engine;

impl Engine {
    /// Append a transaction to the user's ledger and return its id.
    ///
    /// The amount must be positive; `kind` decides the sign. Timestamps are
    /// stored with whole-second precision.
    pub async fn record_transaction(
        &self,
        user_id: i64,
        new: NewTransaction,
    ) -> ResultEngine<i64> {
        if !new.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        let category = normalize_required_name(&new.category, "category", MAX_CATEGORY_LEN)?;
        let description = normalize_optional_text(
            new.description.as_deref(),
            "description",
            MAX_DESCRIPTION_LEN,
        )?;
        let occurred_at = new.occurred_at.unwrap_or_else(Utc::now).trunc_subsecs(0);

        self.require_user(&self.database, user_id).await?;

        let model = transactions::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            kind: ActiveValue::Set(new.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(new.amount.minor()),
            category: ActiveValue::Set(category),
            description: ActiveValue::Set(description),
            occurred_at: ActiveValue::Set(occurred_at),
        };
        let res = transactions::Entity::insert(model)
            .exec(&self.database)
            .await?;
        Ok(res.last_insert_id)
    }

    /// Total income minus total expense over the whole history.
    pub async fn balance(&self, user_id: i64) -> ResultEngine<Money> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT COALESCE(SUM(CASE WHEN kind = ? THEN amount_minor ELSE -amount_minor END), 0) AS balance \
             FROM transactions \
             WHERE user_id = ?",
            vec![TransactionKind::Income.as_str().into(), user_id.into()],
        );
        let row = self.database.query_one(stmt).await?;
        let balance: i64 = match row {
            Some(row) => row.try_get("", "balance")?,
            None => 0,
        };
        Ok(Money::new(balance))
    }
}
