use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, Statement, prelude::*};

use crate::{
    EngineError, Money, ResultEngine, STATISTICS_TOP_N, Transaction, TransactionKind,
    transactions,
};

use super::Engine;

/// Aggregates of one user's ledger over a time window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeriodStatistics {
    pub balance: Money,
    pub total_income: Money,
    pub total_expense: Money,
    /// Up to five expense categories, largest total first.
    pub top_expense_categories: Vec<(String, Money)>,
    /// Up to five transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
}

impl PeriodStatistics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_income.is_zero()
            && self.total_expense.is_zero()
            && self.recent_transactions.is_empty()
    }
}

impl Engine {
    /// Statistics over the inclusive window `[start, end]`.
    pub async fn statistics_for_period(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<PeriodStatistics> {
        if start > end {
            return Err(EngineError::InvalidPeriod(format!(
                "period start {start} is after its end {end}"
            )));
        }
        // Stored timestamps have whole seconds; align the bounds to them.
        let start = if start.timestamp_subsec_nanos() == 0 {
            start
        } else {
            start.trunc_subsecs(0) + TimeDelta::seconds(1)
        };
        let end = end.trunc_subsecs(0);
        let backend = self.database.get_database_backend();

        let totals = Statement::from_sql_and_values(
            backend,
            "SELECT \
               COALESCE(SUM(CASE WHEN kind = ? THEN amount_minor ELSE 0 END), 0) AS income, \
               COALESCE(SUM(CASE WHEN kind = ? THEN amount_minor ELSE 0 END), 0) AS expense \
             FROM transactions \
             WHERE user_id = ? AND occurred_at >= ? AND occurred_at <= ?",
            vec![
                TransactionKind::Income.as_str().into(),
                TransactionKind::Expense.as_str().into(),
                user_id.into(),
                start.into(),
                end.into(),
            ],
        );
        let (income, expense): (i64, i64) = match self.database.query_one(totals).await? {
            Some(row) => (row.try_get("", "income")?, row.try_get("", "expense")?),
            None => (0, 0),
        };

        let top = Statement::from_sql_and_values(
            backend,
            "SELECT category, SUM(amount_minor) AS total \
             FROM transactions \
             WHERE user_id = ? AND kind = ? AND occurred_at >= ? AND occurred_at <= ? \
             GROUP BY category \
             ORDER BY total DESC, MIN(id) ASC \
             LIMIT ?",
            vec![
                user_id.into(),
                TransactionKind::Expense.as_str().into(),
                start.into(),
                end.into(),
                (STATISTICS_TOP_N as i64).into(),
            ],
        );
        let mut top_expense_categories = Vec::new();
        for row in self.database.query_all(top).await? {
            let category: String = row.try_get("", "category")?;
            let total: i64 = row.try_get("", "total")?;
            top_expense_categories.push((category, Money::new(total)));
        }

        let recent_transactions = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lte(end))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Id)
            .limit(STATISTICS_TOP_N)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(PeriodStatistics {
            balance: Money::new(income - expense),
            total_income: Money::new(income),
            total_expense: Money::new(expense),
            top_expense_categories,
            recent_transactions,
        })
    }
}
