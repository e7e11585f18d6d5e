//! Savings goals.
//!
//! A goal is a named target amount with a running saved balance and an
//! optional deadline. Its lifecycle is:
//!
//! ```text
//!            fund (saved >= target)
//!   Active ─────────────────────────▶ Completed
//!     │  ▲
//!     │  │ extend_deadline
//!     ▼  │
//!   Failed
//! ```
//!
//! Money funded into a failed goal keeps it failed. Extending its deadline
//! moves it to `Completed` instead of `Active` when the saved amount already
//! covers the target.
//!
//! `Completed` is never left: withdrawals below the target and deadline
//! changes keep it. Deletion removes the row and is not a state.
//!
//! The transition methods on [`Goal`] are pure; `Engine` loads a goal,
//! applies one of them and writes the result back with a version check.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MAX_GOAL_NAME_LEN, MIN_GOAL_NAME_LEN, Money, ResultEngine,
    util::{name_key, normalize_required_name},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Failed,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for GoalStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::Corrupted(format!(
                "invalid goal status: {other}"
            ))),
        }
    }
}

/// Which goals a listing returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GoalFilter {
    #[default]
    Active,
    Completed,
    Failed,
    All,
}

impl GoalFilter {
    pub(crate) fn status(self) -> Option<GoalStatus> {
        match self {
            Self::Active => Some(GoalStatus::Active),
            Self::Completed => Some(GoalStatus::Completed),
            Self::Failed => Some(GoalStatus::Failed),
            Self::All => None,
        }
    }
}

/// Input of [`Engine::create_goal`](crate::Engine::create_goal).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Money,
    pub deadline: Option<NaiveDate>,
}

/// Result of funding a goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Funding {
    pub current_amount: Money,
    /// `true` only for the funding that moved the goal to `Completed`.
    pub completed_just_now: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub deadline: Option<NaiveDate>,
    pub status: GoalStatus,
    pub created_at: NaiveDate,
    /// Bumped by every persisted mutation.
    pub version: i64,
}

impl Goal {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == GoalStatus::Failed
    }

    /// An active goal whose deadline lies strictly before `as_of`.
    #[must_use]
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        self.is_active() && self.deadline.is_some_and(|deadline| deadline < as_of)
    }

    /// Amount still missing to reach the target (never negative).
    #[must_use]
    pub fn remaining(&self) -> Money {
        if self.current_amount >= self.target_amount {
            Money::ZERO
        } else {
            self.target_amount - self.current_amount
        }
    }

    /// Saved share of the target, capped at 100.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let target = i128::from(self.target_amount.minor());
        if target <= 0 {
            return 0;
        }
        let percent = i128::from(self.current_amount.minor()) * 100 / target;
        percent.clamp(0, 100) as u8
    }

    /// Days until the deadline, negative once it has passed.
    #[must_use]
    pub fn days_left(&self, today: NaiveDate) -> Option<i64> {
        self.deadline
            .map(|deadline| deadline.signed_duration_since(today).num_days())
    }

    /// Adds `amount` to the saved balance. There is no cap at the target.
    pub fn fund(&mut self, amount: Money) -> ResultEngine<Funding> {
        require_positive(amount)?;
        self.current_amount = self
            .current_amount
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;

        let completed_just_now =
            self.is_active() && self.current_amount >= self.target_amount;
        if completed_just_now {
            self.status = GoalStatus::Completed;
        }

        Ok(Funding {
            current_amount: self.current_amount,
            completed_just_now,
        })
    }

    /// Takes `amount` out of the saved balance. The status is left untouched.
    pub fn withdraw(&mut self, amount: Money) -> ResultEngine<Money> {
        require_positive(amount)?;
        if amount > self.current_amount {
            return Err(EngineError::InsufficientFunds {
                available: self.current_amount,
            });
        }
        self.current_amount -= amount;
        if self.current_amount.is_negative() {
            self.current_amount = Money::ZERO;
        }
        Ok(self.current_amount)
    }

    pub fn rename(&mut self, name: &str) -> ResultEngine<()> {
        self.name = normalize_goal_name(name)?;
        Ok(())
    }

    /// Changes the target. It can never drop below what is already saved.
    pub fn retarget(&mut self, target_amount: Money) -> ResultEngine<()> {
        require_positive(target_amount)?;
        if target_amount < self.current_amount {
            return Err(EngineError::TargetBelowSaved {
                target: target_amount,
                saved: self.current_amount,
            });
        }
        self.target_amount = target_amount;
        Ok(())
    }

    /// Plain deadline edit; the status is not affected.
    pub fn reschedule(&mut self, deadline: NaiveDate, today: NaiveDate) -> ResultEngine<()> {
        validate_deadline(deadline, today)?;
        self.deadline = Some(deadline);
        Ok(())
    }

    /// Deadline extension for an expired or failed goal.
    ///
    /// A failed goal becomes active again, or completed when the money saved
    /// while it was failed already covers the target. A completed goal stays
    /// completed.
    pub fn extend_deadline(&mut self, deadline: NaiveDate, today: NaiveDate) -> ResultEngine<()> {
        validate_deadline(deadline, today)?;
        self.deadline = Some(deadline);
        if self.is_failed() {
            self.status = if self.current_amount >= self.target_amount {
                GoalStatus::Completed
            } else {
                GoalStatus::Active
            };
        }
        Ok(())
    }

    pub fn mark_failed(&mut self) -> ResultEngine<()> {
        match self.status {
            GoalStatus::Active | GoalStatus::Failed => {
                self.status = GoalStatus::Failed;
                Ok(())
            }
            GoalStatus::Completed => Err(EngineError::InvalidGoal(
                "a completed goal cannot fail".to_string(),
            )),
        }
    }
}

fn require_positive(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    Ok(())
}

pub(crate) fn normalize_goal_name(name: &str) -> ResultEngine<String> {
    let name = normalize_required_name(name, "goal", MAX_GOAL_NAME_LEN)?;
    if name.chars().count() < MIN_GOAL_NAME_LEN {
        return Err(EngineError::InvalidName(format!(
            "goal name must be at least {MIN_GOAL_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

pub(crate) fn validate_deadline(deadline: NaiveDate, today: NaiveDate) -> ResultEngine<()> {
    if deadline < today {
        return Err(EngineError::PastDeadline(deadline));
    }
    Ok(())
}

pub(crate) fn validate_target(target_amount: Money) -> ResultEngine<()> {
    require_positive(target_amount)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub name_norm: String,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Option<Date>,
    pub status: String,
    pub created_at: Date,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Goal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            target_amount: Money::new(model.target_amount_minor),
            current_amount: Money::new(model.current_amount_minor),
            deadline: model.deadline,
            status: GoalStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            version: model.version,
        })
    }
}

impl Goal {
    /// Active model carrying every mutable column, with the version bumped.
    pub(crate) fn to_update_model(&self) -> ActiveModel {
        use sea_orm::ActiveValue::Set;

        ActiveModel {
            name: Set(self.name.clone()),
            name_norm: Set(name_key(&self.name)),
            target_amount_minor: Set(self.target_amount.minor()),
            current_amount_minor: Set(self.current_amount.minor()),
            deadline: Set(self.deadline),
            status: Set(self.status.as_str().to_string()),
            version: Set(self.version + 1),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vacation() -> Goal {
        Goal {
            id: 1,
            user_id: 42,
            name: "Vacation".to_string(),
            target_amount: Money::new(100_000),
            current_amount: Money::ZERO,
            deadline: Some(day(2026, 12, 31)),
            status: GoalStatus::Active,
            created_at: day(2026, 1, 1),
            version: 0,
        }
    }

    #[test]
    fn funding_completes_once_and_never_caps() {
        let mut goal = vacation();

        let first = goal.fund(Money::new(50_000)).unwrap();
        assert_eq!(first.current_amount, Money::new(50_000));
        assert!(!first.completed_just_now);
        assert!(goal.is_active());

        let second = goal.fund(Money::new(60_000)).unwrap();
        assert_eq!(second.current_amount, Money::new(110_000));
        assert!(second.completed_just_now);
        assert!(goal.is_completed());

        let third = goal.fund(Money::new(1)).unwrap();
        assert_eq!(third.current_amount, Money::new(110_001));
        assert!(!third.completed_just_now);
        assert!(goal.is_completed());
    }

    #[test]
    fn withdrawal_keeps_completion_and_rejects_overdraw() {
        let mut goal = vacation();
        goal.fund(Money::new(100_000)).unwrap();

        assert_eq!(goal.withdraw(Money::new(30_000)).unwrap(), Money::new(70_000));
        assert!(goal.is_completed());

        let err = goal.withdraw(Money::new(70_001)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                available: Money::new(70_000)
            }
        );
        assert_eq!(goal.current_amount, Money::new(70_000));

        assert_eq!(goal.withdraw(Money::new(70_000)).unwrap(), Money::ZERO);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut goal = vacation();
        assert!(goal.fund(Money::ZERO).is_err());
        assert!(goal.withdraw(Money::new(-5)).is_err());
        assert!(goal.retarget(Money::ZERO).is_err());
        assert_eq!(goal, vacation());
    }

    #[test]
    fn retarget_cannot_go_below_saved_amount() {
        let mut goal = vacation();
        goal.fund(Money::new(40_000)).unwrap();

        assert_eq!(
            goal.retarget(Money::new(39_999)).unwrap_err(),
            EngineError::TargetBelowSaved {
                target: Money::new(39_999),
                saved: Money::new(40_000)
            }
        );
        assert_eq!(goal.target_amount, Money::new(100_000));

        goal.retarget(Money::new(40_000)).unwrap();
        goal.retarget(Money::new(40_000)).unwrap();
        assert_eq!(goal.target_amount, Money::new(40_000));
    }

    #[test]
    fn names_are_trimmed_and_need_three_characters() {
        let mut goal = vacation();
        assert!(goal.rename("  ab ").is_err());
        goal.rename("  Car  ").unwrap();
        assert_eq!(goal.name, "Car");
        goal.rename("Дом").unwrap();
        assert_eq!(goal.name, "Дом");
    }

    #[test]
    fn extension_revives_failed_but_not_completed() {
        let today = day(2026, 6, 1);

        let mut failed = vacation();
        failed.mark_failed().unwrap();
        assert!(failed.is_failed());
        failed.extend_deadline(day(2026, 7, 1), today).unwrap();
        assert!(failed.is_active());
        assert_eq!(failed.deadline, Some(day(2026, 7, 1)));

        let mut completed = vacation();
        completed.fund(Money::new(100_000)).unwrap();
        completed.extend_deadline(day(2026, 7, 1), today).unwrap();
        assert!(completed.is_completed());

        assert_eq!(
            completed.extend_deadline(day(2026, 5, 31), today).unwrap_err(),
            EngineError::PastDeadline(day(2026, 5, 31))
        );
    }

    #[test]
    fn extension_completes_failed_goal_funded_past_target() {
        let today = day(2026, 6, 1);
        let mut goal = vacation();
        goal.mark_failed().unwrap();

        let funding = goal.fund(Money::new(150_000)).unwrap();
        assert!(!funding.completed_just_now);
        assert!(goal.is_failed());

        goal.extend_deadline(day(2026, 7, 1), today).unwrap();
        assert!(goal.is_completed());
        assert_eq!(goal.progress_percent(), 100);
    }

    #[test]
    fn reschedule_never_changes_status() {
        let today = day(2026, 6, 1);
        let mut failed = vacation();
        failed.mark_failed().unwrap();
        failed.reschedule(day(2026, 6, 1), today).unwrap();
        assert!(failed.is_failed());
    }

    #[test]
    fn completed_goals_cannot_be_marked_failed() {
        let mut goal = vacation();
        goal.fund(Money::new(100_000)).unwrap();
        assert!(goal.mark_failed().is_err());
        assert!(goal.is_completed());
    }

    #[test]
    fn expiry_and_progress() {
        let mut goal = vacation();
        assert!(!goal.is_expired(day(2026, 12, 31)));
        assert!(goal.is_expired(day(2027, 1, 1)));
        assert_eq!(goal.days_left(day(2026, 12, 30)), Some(1));
        assert_eq!(goal.days_left(day(2027, 1, 2)), Some(-2));

        goal.fund(Money::new(33_333)).unwrap();
        assert_eq!(goal.progress_percent(), 33);
        assert_eq!(goal.remaining(), Money::new(66_667));

        goal.fund(Money::new(100_000)).unwrap();
        assert_eq!(goal.progress_percent(), 100);
        assert_eq!(goal.remaining(), Money::ZERO);
        assert!(!goal.is_expired(day(2030, 1, 1)));

        let open_ended = Goal {
            deadline: None,
            ..vacation()
        };
        assert!(!open_ended.is_expired(day(2100, 1, 1)));
    }
}
