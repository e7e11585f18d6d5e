use chrono::NaiveDate;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, Funding, Goal, GoalFilter, GoalStatus, Money, NewGoal, ResultEngine,
    goals::{self, normalize_goal_name, validate_deadline, validate_target},
    util::name_key,
};

use super::Engine;

/// How many times a goal update is retried after losing a version race.
const MAX_GOAL_UPDATE_ATTEMPTS: usize = 8;

impl Engine {
    /// Create an active goal with nothing saved yet and return its id.
    pub async fn create_goal(
        &self,
        user_id: i64,
        new: NewGoal,
        today: NaiveDate,
    ) -> ResultEngine<i64> {
        let name = normalize_goal_name(&new.name)?;
        validate_target(new.target_amount)?;
        if let Some(deadline) = new.deadline {
            validate_deadline(deadline, today)?;
        }

        self.require_user(&self.database, user_id).await?;

        let model = goals::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            name_norm: ActiveValue::Set(name_key(&name)),
            name: ActiveValue::Set(name),
            target_amount_minor: ActiveValue::Set(new.target_amount.minor()),
            current_amount_minor: ActiveValue::Set(0),
            deadline: ActiveValue::Set(new.deadline),
            status: ActiveValue::Set(GoalStatus::Active.as_str().to_string()),
            created_at: ActiveValue::Set(today),
            version: ActiveValue::Set(0),
        };
        let res = goals::Entity::insert(model).exec(&self.database).await?;
        Ok(res.last_insert_id)
    }

    pub async fn goal(&self, user_id: i64, goal_id: i64) -> ResultEngine<Option<Goal>> {
        goals::Entity::find_by_id(goal_id)
            .filter(goals::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .map(Goal::try_from)
            .transpose()
    }

    /// Case-insensitive lookup by name. With duplicates the oldest goal wins.
    pub async fn goal_by_name(&self, user_id: i64, name: &str) -> ResultEngine<Option<Goal>> {
        goals::Entity::find()
            .filter(goals::Column::UserId.eq(user_id))
            .filter(goals::Column::NameNorm.eq(name_key(name)))
            .order_by_asc(goals::Column::Id)
            .one(&self.database)
            .await?
            .map(Goal::try_from)
            .transpose()
    }

    /// The user's goals in creation order.
    pub async fn goals(&self, user_id: i64, filter: GoalFilter) -> ResultEngine<Vec<Goal>> {
        let mut query = goals::Entity::find().filter(goals::Column::UserId.eq(user_id));
        if let Some(status) = filter.status() {
            query = query.filter(goals::Column::Status.eq(status.as_str()));
        }
        query
            .order_by_asc(goals::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Goal::try_from)
            .collect()
    }

    /// Active goals whose deadline is strictly before `as_of`.
    pub async fn find_expired_goals(
        &self,
        user_id: i64,
        as_of: NaiveDate,
    ) -> ResultEngine<Vec<Goal>> {
        goals::Entity::find()
            .filter(goals::Column::UserId.eq(user_id))
            .filter(goals::Column::Status.eq(GoalStatus::Active.as_str()))
            .filter(goals::Column::Deadline.is_not_null())
            .filter(goals::Column::Deadline.lt(as_of))
            .order_by_asc(goals::Column::Deadline)
            .order_by_asc(goals::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Goal::try_from)
            .collect()
    }

    /// Add money to a goal. Completes it when the target is reached.
    pub async fn fund_goal(
        &self,
        user_id: i64,
        goal_id: i64,
        amount: Money,
    ) -> ResultEngine<Funding> {
        self.mutate_goal(user_id, goal_id, |goal| goal.fund(amount))
            .await
    }

    /// Take money out of a goal and return what is left.
    pub async fn withdraw_from_goal(
        &self,
        user_id: i64,
        goal_id: i64,
        amount: Money,
    ) -> ResultEngine<Money> {
        self.mutate_goal(user_id, goal_id, |goal| goal.withdraw(amount))
            .await
    }

    pub async fn rename_goal(&self, user_id: i64, goal_id: i64, name: &str) -> ResultEngine<()> {
        self.mutate_goal(user_id, goal_id, |goal| goal.rename(name))
            .await
    }

    pub async fn retarget_goal(
        &self,
        user_id: i64,
        goal_id: i64,
        target_amount: Money,
    ) -> ResultEngine<()> {
        self.mutate_goal(user_id, goal_id, |goal| goal.retarget(target_amount))
            .await
    }

    pub async fn reschedule_goal(
        &self,
        user_id: i64,
        goal_id: i64,
        deadline: NaiveDate,
        today: NaiveDate,
    ) -> ResultEngine<()> {
        self.mutate_goal(user_id, goal_id, |goal| goal.reschedule(deadline, today))
            .await
    }

    /// Move the deadline of an expired or failed goal; a failed goal becomes
    /// active again.
    pub async fn extend_goal_deadline(
        &self,
        user_id: i64,
        goal_id: i64,
        deadline: NaiveDate,
        today: NaiveDate,
    ) -> ResultEngine<()> {
        self.mutate_goal(user_id, goal_id, |goal| goal.extend_deadline(deadline, today))
            .await
    }

    pub async fn mark_goal_failed(&self, user_id: i64, goal_id: i64) -> ResultEngine<()> {
        self.mutate_goal(user_id, goal_id, Goal::mark_failed).await
    }

    pub async fn delete_goal(&self, user_id: i64, goal_id: i64) -> ResultEngine<()> {
        let res = goals::Entity::delete_many()
            .filter(goals::Column::Id.eq(goal_id))
            .filter(goals::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("goal not exists".to_string()));
        }
        Ok(())
    }

    /// Load the goal, apply `apply` and write it back if nobody else changed
    /// it in the meantime. A lost race reloads and applies again.
    async fn mutate_goal<T, F>(&self, user_id: i64, goal_id: i64, mut apply: F) -> ResultEngine<T>
    where
        F: FnMut(&mut Goal) -> ResultEngine<T>,
    {
        for _ in 0..MAX_GOAL_UPDATE_ATTEMPTS {
            let mut goal = self
                .goal(user_id, goal_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
            let expected_version = goal.version;
            let output = apply(&mut goal)?;

            let res = goals::Entity::update_many()
                .set(goal.to_update_model())
                .filter(goals::Column::Id.eq(goal_id))
                .filter(goals::Column::UserId.eq(user_id))
                .filter(goals::Column::Version.eq(expected_version))
                .exec(&self.database)
                .await?;
            if res.rows_affected == 1 {
                return Ok(output);
            }
        }
        Err(EngineError::Conflict(format!(
            "goal {goal_id} changed concurrently"
        )))
    }
}
