//! Conversation state machine.
//!
//! Every chat user is in exactly one [`State`]. An update is turned into an
//! [`Input`] and fed to [`step`], which is pure: it validates typed answers,
//! decides the next state and either replies directly or asks the handler to
//! run a [`Command`] against the engine. The next state of a command only
//! takes effect when the command succeeds.

use chrono::NaiveDate;
use engine::{Currency, GoalFilter, Money, NewGoal, NewTransaction, TransactionKind};

use crate::{
    parsing::{
        ParseError, parse_amount, parse_category, parse_deadline, parse_description,
        parse_display_name, parse_goal_name,
    },
    periods::Period,
    ui::{self, Reply},
};

/// Main menu entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MenuItem {
    Expense,
    Income,
    Statistics,
    Goals,
    Settings,
    About,
    Help,
}

/// Goals menu entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GoalsItem {
    Create,
    Fund,
    Withdraw,
    Edit,
    Delete,
    List(GoalFilter),
}

/// Why the user is picking a goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GoalPurpose {
    Fund,
    Withdraw,
    Edit,
    Delete,
}

impl GoalPurpose {
    /// Goals offered for this purpose.
    pub(crate) fn filter(self) -> GoalFilter {
        match self {
            GoalPurpose::Fund | GoalPurpose::Withdraw | GoalPurpose::Edit => GoalFilter::Active,
            GoalPurpose::Delete => GoalFilter::All,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AmountOp {
    Fund,
    Withdraw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditField {
    Name,
    Target,
    Deadline,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExpiredChoice {
    Extend,
    Fail,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CategoryChoice {
    Preset(usize),
    Custom,
}

/// A button press, decoded from its callback data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Menu(MenuItem),
    Back,
    Currency(Currency),
    Category(CategoryChoice),
    Skip,
    Period(Period),
    Goals(GoalsItem),
    PickGoal(i64),
    Edit(EditField),
    Confirm(bool),
    Expired(ExpiredChoice, i64),
}

impl Action {
    /// Callback data carried by the button.
    pub(crate) fn data(&self) -> String {
        match self {
            Action::Menu(item) => {
                let item = match item {
                    MenuItem::Expense => "expense",
                    MenuItem::Income => "income",
                    MenuItem::Statistics => "stats",
                    MenuItem::Goals => "goals",
                    MenuItem::Settings => "settings",
                    MenuItem::About => "about",
                    MenuItem::Help => "help",
                };
                format!("menu:{item}")
            }
            Action::Back => "nav:back".to_string(),
            Action::Currency(currency) => format!("cur:{}", currency.code()),
            Action::Category(CategoryChoice::Preset(idx)) => format!("cat:{idx}"),
            Action::Category(CategoryChoice::Custom) => "cat:custom".to_string(),
            Action::Skip => "skip".to_string(),
            Action::Period(period) => format!("period:{}", period.as_str()),
            Action::Goals(item) => {
                let item = match item {
                    GoalsItem::Create => "create",
                    GoalsItem::Fund => "fund",
                    GoalsItem::Withdraw => "withdraw",
                    GoalsItem::Edit => "edit",
                    GoalsItem::Delete => "delete",
                    GoalsItem::List(GoalFilter::Active) => "active",
                    GoalsItem::List(GoalFilter::Completed) => "completed",
                    GoalsItem::List(GoalFilter::Failed) => "failed",
                    GoalsItem::List(GoalFilter::All) => "all",
                };
                format!("goals:{item}")
            }
            Action::PickGoal(id) => format!("goal:{id}"),
            Action::Edit(field) => {
                let field = match field {
                    EditField::Name => "name",
                    EditField::Target => "target",
                    EditField::Deadline => "deadline",
                    EditField::Cancel => "cancel",
                };
                format!("edit:{field}")
            }
            Action::Confirm(yes) => format!("confirm:{}", if *yes { "yes" } else { "no" }),
            Action::Expired(choice, id) => {
                let choice = match choice {
                    ExpiredChoice::Extend => "extend",
                    ExpiredChoice::Fail => "fail",
                    ExpiredChoice::Delete => "delete",
                };
                format!("expired:{choice}:{id}")
            }
        }
    }

    pub(crate) fn parse(data: &str) -> Option<Action> {
        let (head, tail) = data.split_once(':').unwrap_or((data, ""));
        let action = match (head, tail) {
            ("menu", "expense") => Action::Menu(MenuItem::Expense),
            ("menu", "income") => Action::Menu(MenuItem::Income),
            ("menu", "stats") => Action::Menu(MenuItem::Statistics),
            ("menu", "goals") => Action::Menu(MenuItem::Goals),
            ("menu", "settings") => Action::Menu(MenuItem::Settings),
            ("menu", "about") => Action::Menu(MenuItem::About),
            ("menu", "help") => Action::Menu(MenuItem::Help),
            ("nav", "back") => Action::Back,
            ("cur", code) => Action::Currency(Currency::try_from(code).ok()?),
            ("cat", "custom") => Action::Category(CategoryChoice::Custom),
            ("cat", idx) => Action::Category(CategoryChoice::Preset(idx.parse().ok()?)),
            ("skip", "") => Action::Skip,
            ("period", period) => Action::Period(Period::parse(period)?),
            ("goals", "create") => Action::Goals(GoalsItem::Create),
            ("goals", "fund") => Action::Goals(GoalsItem::Fund),
            ("goals", "withdraw") => Action::Goals(GoalsItem::Withdraw),
            ("goals", "edit") => Action::Goals(GoalsItem::Edit),
            ("goals", "delete") => Action::Goals(GoalsItem::Delete),
            ("goals", "active") => Action::Goals(GoalsItem::List(GoalFilter::Active)),
            ("goals", "completed") => Action::Goals(GoalsItem::List(GoalFilter::Completed)),
            ("goals", "failed") => Action::Goals(GoalsItem::List(GoalFilter::Failed)),
            ("goals", "all") => Action::Goals(GoalsItem::List(GoalFilter::All)),
            ("goal", id) => Action::PickGoal(id.parse().ok()?),
            ("edit", "name") => Action::Edit(EditField::Name),
            ("edit", "target") => Action::Edit(EditField::Target),
            ("edit", "deadline") => Action::Edit(EditField::Deadline),
            ("edit", "cancel") => Action::Edit(EditField::Cancel),
            ("confirm", "yes") => Action::Confirm(true),
            ("confirm", "no") => Action::Confirm(false),
            ("expired", rest) => {
                let (choice, id) = rest.split_once(':')?;
                let choice = match choice {
                    "extend" => ExpiredChoice::Extend,
                    "fail" => ExpiredChoice::Fail,
                    "delete" => ExpiredChoice::Delete,
                    _ => return None,
                };
                Action::Expired(choice, id.parse().ok()?)
            }
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Text(String),
    Action(Action),
}

/// How a goal is designated while picking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum GoalRef {
    Id(i64),
    Name(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum State {
    #[default]
    Idle,
    RegistrationName,
    RegistrationCurrency {
        name: String,
    },
    EntryCategory {
        kind: TransactionKind,
    },
    EntryCustomCategory {
        kind: TransactionKind,
    },
    EntryAmount {
        kind: TransactionKind,
        category: String,
    },
    EntryDescription {
        kind: TransactionKind,
        category: String,
        amount: Money,
    },
    StatisticsPeriod,
    GoalsMenu,
    GoalCreateName,
    GoalCreateTarget {
        name: String,
    },
    GoalCreateDeadline {
        name: String,
        target: Money,
    },
    GoalPick {
        purpose: GoalPurpose,
    },
    GoalAmount {
        op: AmountOp,
        goal_id: i64,
    },
    GoalConfirmDelete {
        goal_id: i64,
    },
    GoalEditChoice {
        goal_id: i64,
    },
    GoalEditName {
        goal_id: i64,
    },
    GoalEditTarget {
        goal_id: i64,
    },
    GoalEditDeadline {
        goal_id: i64,
    },
    ExpiredExtend {
        goal_id: i64,
    },
    Settings,
}

impl State {
    pub(crate) fn is_registration(&self) -> bool {
        matches!(
            self,
            State::RegistrationName | State::RegistrationCurrency { .. }
        )
    }
}

/// Work the handler performs against the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Register { name: String, currency: Currency },
    Record(NewTransaction),
    Statistics(Period),
    OpenGoals,
    ListGoals(GoalFilter),
    PickGoal(GoalPurpose),
    SelectGoal { purpose: GoalPurpose, goal: GoalRef },
    CreateGoal(NewGoal),
    Fund { goal_id: i64, amount: Money },
    Withdraw { goal_id: i64, amount: Money },
    Rename { goal_id: i64, name: String },
    Retarget { goal_id: i64, target: Money },
    Reschedule { goal_id: i64, deadline: NaiveDate },
    ExtendDeadline { goal_id: i64, deadline: NaiveDate },
    MarkFailed { goal_id: i64 },
    Delete { goal_id: i64 },
    ShowSettings,
    SetCurrency(Currency),
}

#[derive(Clone, Debug)]
pub(crate) enum Effect {
    Reply(Reply),
    Run(Command),
}

#[derive(Clone, Debug)]
pub(crate) struct Outcome {
    pub state: State,
    pub effect: Effect,
}

impl Outcome {
    fn reply(state: State, reply: Reply) -> Self {
        Self {
            state,
            effect: Effect::Reply(reply),
        }
    }

    fn run(state: State, command: Command) -> Self {
        Self {
            state,
            effect: Effect::Run(command),
        }
    }

    /// Stay where we are and explain what was wrong.
    fn retry(state: State, err: ParseError) -> Self {
        Self::reply(state, ui::mistake(&err.to_string()))
    }
}

/// Advance the conversation by one input.
pub(crate) fn step(state: State, input: Input, today: NaiveDate) -> Outcome {
    // Menu buttons and "back" work from anywhere once registered.
    if !state.is_registration()
        && let Input::Action(action) = &input
    {
        match action {
            Action::Menu(item) => return open_menu(*item),
            Action::Back => {
                return Outcome::reply(State::Idle, ui::main_menu("🔙 Возврат в главное меню"));
            }
            Action::Goals(item) => return open_goals_item(*item),
            Action::Expired(choice, goal_id) => return expired_choice(*choice, *goal_id),
            _ => {}
        }
    }

    match (state, input) {
        (State::RegistrationName, Input::Text(text)) => match parse_display_name(&text) {
            Ok(name) => Outcome::reply(State::RegistrationCurrency { name }, ui::ask_currency()),
            Err(err) => Outcome::retry(State::RegistrationName, err),
        },
        (State::RegistrationName, Input::Action(_)) => {
            Outcome::reply(State::RegistrationName, ui::ask_name())
        }
        (State::RegistrationCurrency { name }, Input::Action(Action::Currency(currency))) => {
            Outcome::run(State::Idle, Command::Register { name, currency })
        }
        (state @ State::RegistrationCurrency { .. }, _) => {
            Outcome::reply(state, ui::ask_currency())
        }

        (State::EntryCategory { kind }, Input::Action(Action::Category(choice))) => match choice {
            CategoryChoice::Custom => {
                Outcome::reply(State::EntryCustomCategory { kind }, ui::ask_custom_category())
            }
            CategoryChoice::Preset(idx) => match ui::preset_category(kind, idx) {
                Some(category) => ask_entry_amount(kind, category.to_string()),
                None => Outcome::reply(State::EntryCategory { kind }, ui::ask_category(kind)),
            },
        },
        (
            State::EntryCategory { kind } | State::EntryCustomCategory { kind },
            Input::Text(text),
        ) => {
            match parse_category(&text) {
                Ok(category) => ask_entry_amount(kind, category),
                Err(err) => Outcome::retry(State::EntryCustomCategory { kind }, err),
            }
        }
        (State::EntryAmount { kind, category }, Input::Text(text)) => match parse_amount(&text) {
            Ok(amount) => Outcome::reply(
                State::EntryDescription {
                    kind,
                    category,
                    amount,
                },
                ui::ask_description(),
            ),
            Err(err) => Outcome::retry(State::EntryAmount { kind, category }, err),
        },
        (
            State::EntryDescription {
                kind,
                category,
                amount,
            },
            Input::Text(text),
        ) => match parse_description(&text) {
            Ok(description) => Outcome::run(
                State::Idle,
                Command::Record(
                    NewTransaction::new(kind, amount, category).description(Some(&description)),
                ),
            ),
            Err(err) => Outcome::retry(
                State::EntryDescription {
                    kind,
                    category,
                    amount,
                },
                err,
            ),
        },
        (
            State::EntryDescription {
                kind,
                category,
                amount,
            },
            Input::Action(Action::Skip),
        ) => Outcome::run(
            State::Idle,
            Command::Record(NewTransaction::new(kind, amount, category)),
        ),

        (State::StatisticsPeriod, Input::Action(Action::Period(period))) => {
            Outcome::run(State::Idle, Command::Statistics(period))
        }
        (State::StatisticsPeriod, _) => Outcome::reply(State::StatisticsPeriod, ui::ask_period()),

        (State::GoalCreateName, Input::Text(text)) => match parse_goal_name(&text) {
            Ok(name) => Outcome::reply(State::GoalCreateTarget { name }, ui::ask_goal_target()),
            Err(err) => Outcome::retry(State::GoalCreateName, err),
        },
        (State::GoalCreateTarget { name }, Input::Text(text)) => match parse_amount(&text) {
            Ok(target) => Outcome::reply(
                State::GoalCreateDeadline { name, target },
                ui::ask_goal_deadline(),
            ),
            Err(err) => Outcome::retry(State::GoalCreateTarget { name }, err),
        },
        (State::GoalCreateDeadline { name, target }, Input::Text(text)) => {
            match parse_deadline(&text, today) {
                Ok(deadline) => Outcome::run(
                    State::GoalsMenu,
                    Command::CreateGoal(NewGoal {
                        name,
                        target_amount: target,
                        deadline: Some(deadline),
                    }),
                ),
                Err(err) => Outcome::retry(State::GoalCreateDeadline { name, target }, err),
            }
        }
        (State::GoalCreateDeadline { name, target }, Input::Action(Action::Skip)) => Outcome::run(
            State::GoalsMenu,
            Command::CreateGoal(NewGoal {
                name,
                target_amount: target,
                deadline: None,
            }),
        ),

        (State::GoalPick { purpose }, Input::Action(Action::PickGoal(goal_id))) => Outcome::run(
            State::GoalPick { purpose },
            Command::SelectGoal {
                purpose,
                goal: GoalRef::Id(goal_id),
            },
        ),
        (State::GoalPick { purpose }, Input::Text(text)) => Outcome::run(
            State::GoalPick { purpose },
            Command::SelectGoal {
                purpose,
                goal: GoalRef::Name(text),
            },
        ),

        (State::GoalAmount { op, goal_id }, Input::Text(text)) => match parse_amount(&text) {
            Ok(amount) => {
                let command = match op {
                    AmountOp::Fund => Command::Fund { goal_id, amount },
                    AmountOp::Withdraw => Command::Withdraw { goal_id, amount },
                };
                Outcome::run(State::GoalsMenu, command)
            }
            Err(err) => Outcome::retry(State::GoalAmount { op, goal_id }, err),
        },

        (State::GoalConfirmDelete { goal_id }, Input::Action(Action::Confirm(true))) => {
            Outcome::run(State::GoalsMenu, Command::Delete { goal_id })
        }
        (State::GoalConfirmDelete { .. }, Input::Action(Action::Confirm(false))) => {
            Outcome::reply(State::GoalsMenu, ui::goals_menu("🚫 Удаление отменено"))
        }

        (State::GoalEditChoice { goal_id }, Input::Action(Action::Edit(field))) => match field {
            EditField::Name => Outcome::reply(State::GoalEditName { goal_id }, ui::ask_new_name()),
            EditField::Target => {
                Outcome::reply(State::GoalEditTarget { goal_id }, ui::ask_new_target())
            }
            EditField::Deadline => {
                Outcome::reply(State::GoalEditDeadline { goal_id }, ui::ask_new_deadline())
            }
            EditField::Cancel => {
                Outcome::reply(State::GoalsMenu, ui::goals_menu("✖️ Редактирование отменено"))
            }
        },
        (State::GoalEditName { goal_id }, Input::Text(text)) => match parse_goal_name(&text) {
            Ok(name) => Outcome::run(State::GoalsMenu, Command::Rename { goal_id, name }),
            Err(err) => Outcome::retry(State::GoalEditName { goal_id }, err),
        },
        (State::GoalEditTarget { goal_id }, Input::Text(text)) => match parse_amount(&text) {
            Ok(target) => Outcome::run(State::GoalsMenu, Command::Retarget { goal_id, target }),
            Err(err) => Outcome::retry(State::GoalEditTarget { goal_id }, err),
        },
        (State::GoalEditDeadline { goal_id }, Input::Text(text)) => {
            match parse_deadline(&text, today) {
                Ok(deadline) => {
                    Outcome::run(State::GoalsMenu, Command::Reschedule { goal_id, deadline })
                }
                Err(err) => Outcome::retry(State::GoalEditDeadline { goal_id }, err),
            }
        }
        (State::ExpiredExtend { goal_id }, Input::Text(text)) => {
            match parse_deadline(&text, today) {
                Ok(deadline) => Outcome::run(
                    State::GoalsMenu,
                    Command::ExtendDeadline { goal_id, deadline },
                ),
                Err(err) => Outcome::retry(State::ExpiredExtend { goal_id }, err),
            }
        }

        (State::Settings, Input::Action(Action::Currency(currency))) => {
            Outcome::run(State::Idle, Command::SetCurrency(currency))
        }

        (State::Idle, _) => Outcome::reply(State::Idle, ui::main_menu("Выберите пункт меню:")),
        (state, _) => Outcome::reply(state, ui::use_buttons()),
    }
}

fn open_menu(item: MenuItem) -> Outcome {
    match item {
        MenuItem::Expense => Outcome::reply(
            State::EntryCategory {
                kind: TransactionKind::Expense,
            },
            ui::ask_category(TransactionKind::Expense),
        ),
        MenuItem::Income => Outcome::reply(
            State::EntryCategory {
                kind: TransactionKind::Income,
            },
            ui::ask_category(TransactionKind::Income),
        ),
        MenuItem::Statistics => Outcome::reply(State::StatisticsPeriod, ui::ask_period()),
        MenuItem::Goals => Outcome::run(State::GoalsMenu, Command::OpenGoals),
        MenuItem::Settings => Outcome::run(State::Settings, Command::ShowSettings),
        MenuItem::About => Outcome::reply(State::Idle, ui::about()),
        MenuItem::Help => Outcome::reply(State::Idle, ui::help()),
    }
}

fn open_goals_item(item: GoalsItem) -> Outcome {
    match item {
        GoalsItem::Create => Outcome::reply(State::GoalCreateName, ui::ask_goal_name()),
        GoalsItem::Fund => Outcome::run(State::GoalsMenu, Command::PickGoal(GoalPurpose::Fund)),
        GoalsItem::Withdraw => {
            Outcome::run(State::GoalsMenu, Command::PickGoal(GoalPurpose::Withdraw))
        }
        GoalsItem::Edit => Outcome::run(State::GoalsMenu, Command::PickGoal(GoalPurpose::Edit)),
        GoalsItem::Delete => Outcome::run(State::GoalsMenu, Command::PickGoal(GoalPurpose::Delete)),
        GoalsItem::List(filter) => Outcome::run(State::GoalsMenu, Command::ListGoals(filter)),
    }
}

fn expired_choice(choice: ExpiredChoice, goal_id: i64) -> Outcome {
    match choice {
        ExpiredChoice::Extend => {
            Outcome::reply(State::ExpiredExtend { goal_id }, ui::ask_new_deadline())
        }
        ExpiredChoice::Fail => Outcome::run(State::GoalsMenu, Command::MarkFailed { goal_id }),
        ExpiredChoice::Delete => Outcome::run(
            State::GoalsMenu,
            Command::SelectGoal {
                purpose: GoalPurpose::Delete,
                goal: GoalRef::Id(goal_id),
            },
        ),
    }
}

fn ask_entry_amount(kind: TransactionKind, category: String) -> Outcome {
    let reply = ui::ask_amount(kind, &category);
    Outcome::reply(State::EntryAmount { kind, category }, reply)
}
