//! Handler for savings goals

use engine::{EngineError, Goal, ResultEngine};

use super::{Context, Next};
use crate::{
    dialogue::{AmountOp, Command, GoalPurpose, GoalRef, State},
    ui,
};

pub(super) async fn execute(
    ctx: &Context<'_>,
    command: Command,
    state: State,
) -> ResultEngine<Next> {
    let engine = &ctx.cfg.engine;
    let user_id = ctx.user_id;

    let next = match command {
        Command::OpenGoals => {
            let expired = engine.find_expired_goals(user_id, ctx.today).await?;
            if expired.is_empty() {
                Next::new(ui::goals_home(), state)
            } else {
                tracing::debug!("User {user_id} has {} expired goals", expired.len());
                Next::new(ui::expired_goals(&expired, ctx.currency, ctx.today), state)
            }
        }
        Command::ListGoals(filter) => {
            let goals = engine.goals(user_id, filter).await?;
            Next::new(ui::goals_list(filter, &goals, ctx.currency, ctx.today), state)
        }
        Command::PickGoal(purpose) => {
            let goals = engine.goals(user_id, purpose.filter()).await?;
            if goals.is_empty() {
                Next::new(ui::no_goals_for(purpose), State::GoalsMenu)
            } else {
                Next::new(ui::goal_picker(&goals), State::GoalPick { purpose })
            }
        }
        Command::SelectGoal { purpose, goal } => {
            let found = match goal {
                GoalRef::Id(goal_id) => Some(require_goal(ctx, goal_id).await?),
                GoalRef::Name(name) => engine.goal_by_name(user_id, &name).await?,
            };
            match found {
                Some(goal) => selected(ctx, purpose, &goal),
                None => Next::new(ui::mistake("Цель не найдена"), state),
            }
        }
        Command::CreateGoal(new) => {
            let goal_id = engine.create_goal(user_id, new, ctx.today).await?;
            let goal = require_goal(ctx, goal_id).await?;
            tracing::info!("User {user_id} created goal {goal_id}");
            Next::new(ui::goal_created(&goal, ctx.currency, ctx.today), state)
        }
        Command::Fund { goal_id, amount } => {
            let funding = engine.fund_goal(user_id, goal_id, amount).await?;
            let goal = require_goal(ctx, goal_id).await?;
            if funding.completed_just_now {
                tracing::info!("User {user_id} completed goal {goal_id}");
            }
            Next::new(ui::funded(&goal, amount, funding, ctx.currency), state)
        }
        Command::Withdraw { goal_id, amount } => {
            let current = engine.withdraw_from_goal(user_id, goal_id, amount).await?;
            Next::new(ui::withdrawn(amount, current, ctx.currency), state)
        }
        Command::Rename { goal_id, name } => {
            engine.rename_goal(user_id, goal_id, &name).await?;
            updated(ctx, goal_id, state).await?
        }
        Command::Retarget { goal_id, target } => {
            engine.retarget_goal(user_id, goal_id, target).await?;
            updated(ctx, goal_id, state).await?
        }
        Command::Reschedule { goal_id, deadline } => {
            engine
                .reschedule_goal(user_id, goal_id, deadline, ctx.today)
                .await?;
            updated(ctx, goal_id, state).await?
        }
        Command::ExtendDeadline { goal_id, deadline } => {
            engine
                .extend_goal_deadline(user_id, goal_id, deadline, ctx.today)
                .await?;
            updated(ctx, goal_id, state).await?
        }
        Command::MarkFailed { goal_id } => {
            engine.mark_goal_failed(user_id, goal_id).await?;
            Next::new(ui::goal_failed(), state)
        }
        Command::Delete { goal_id } => {
            engine.delete_goal(user_id, goal_id).await?;
            tracing::info!("User {user_id} deleted goal {goal_id}");
            Next::new(ui::goal_deleted(), state)
        }
        other @ (Command::Register { .. }
        | Command::Record(_)
        | Command::Statistics(_)
        | Command::ShowSettings
        | Command::SetCurrency(_)) => {
            tracing::warn!("Not a goal command: {other:?}");
            Next::new(ui::goals_home(), State::GoalsMenu)
        }
    };
    Ok(next)
}

/// Continue with the goal the user picked.
fn selected(ctx: &Context<'_>, purpose: GoalPurpose, goal: &Goal) -> Next {
    let goal_id = goal.id;
    match purpose {
        GoalPurpose::Fund => Next::new(
            ui::ask_goal_amount(AmountOp::Fund, goal, ctx.currency),
            State::GoalAmount {
                op: AmountOp::Fund,
                goal_id,
            },
        ),
        GoalPurpose::Withdraw => Next::new(
            ui::ask_goal_amount(AmountOp::Withdraw, goal, ctx.currency),
            State::GoalAmount {
                op: AmountOp::Withdraw,
                goal_id,
            },
        ),
        GoalPurpose::Edit => Next::new(
            ui::edit_menu(goal, ctx.currency, ctx.today),
            State::GoalEditChoice { goal_id },
        ),
        GoalPurpose::Delete => Next::new(
            ui::confirm_delete(goal),
            State::GoalConfirmDelete { goal_id },
        ),
    }
}

async fn require_goal(ctx: &Context<'_>, goal_id: i64) -> ResultEngine<Goal> {
    ctx.cfg
        .engine
        .goal(ctx.user_id, goal_id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))
}

async fn updated(ctx: &Context<'_>, goal_id: i64, state: State) -> ResultEngine<Next> {
    let goal = require_goal(ctx, goal_id).await?;
    Ok(Next::new(
        ui::goal_updated(&goal, ctx.currency, ctx.today),
        state,
    ))
}
