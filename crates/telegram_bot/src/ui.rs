//! Texts and inline keyboards sent to the user.

use chrono::NaiveDate;
use chrono_tz::Tz;
use engine::{
    Currency, EngineError, ErrorKind, Funding, Goal, GoalFilter, GoalStatus, Money,
    NewTransaction, PeriodStatistics, TransactionKind, User,
};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::{
    dialogue::{
        Action, AmountOp, CategoryChoice, EditField, ExpiredChoice, GoalPurpose, GoalsItem,
        MenuItem,
    },
    parsing::DATE_FORMAT,
    periods::Period,
};

const EXPENSE_CATEGORIES: [(&str, &str); 5] = [
    ("🍔", "Еда"),
    ("🚕", "Транспорт"),
    ("🏠", "Жильё"),
    ("🎮", "Развлечения"),
    ("🛒", "Покупки"),
];

const INCOME_CATEGORIES: [(&str, &str); 5] = [
    ("💰", "Зарплата"),
    ("🧾", "Бонус"),
    ("🎁", "Подарок"),
    ("📈", "Инвестиции"),
    ("💼", "Самозанятость"),
];

/// A message ready to be sent.
#[derive(Clone, Debug)]
pub(crate) struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

fn button(label: impl Into<String>, action: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.data())
}

fn back_row() -> Vec<InlineKeyboardButton> {
    vec![button("🔙 Назад", Action::Back)]
}

fn goals_back_row() -> Vec<InlineKeyboardButton> {
    vec![button("🔙 К целям", Action::Menu(MenuItem::Goals))]
}

fn categories(kind: TransactionKind) -> &'static [(&'static str, &'static str); 5] {
    match kind {
        TransactionKind::Expense => &EXPENSE_CATEGORIES,
        TransactionKind::Income => &INCOME_CATEGORIES,
    }
}

/// Stored name of the preset category at `idx`.
pub(crate) fn preset_category(kind: TransactionKind, idx: usize) -> Option<&'static str> {
    categories(kind).get(idx).map(|(_, name)| *name)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration and main menu
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn welcome() -> Reply {
    Reply::text(
        "👋 Привет! Я ваш личный Finance Keeper.\n\
         Я помогу учитывать доходы и расходы, копить на цели и смотреть статистику.\n\n\
         Как я могу к тебе обращаться?",
    )
}

pub(crate) fn ask_name() -> Reply {
    Reply::text("Как я могу к тебе обращаться?")
}

fn currency_keyboard() -> InlineKeyboardMarkup {
    let flag = |currency: Currency| match currency {
        Currency::Rub => "🇷🇺",
        Currency::Usd => "🇺🇸",
        Currency::Eur => "🇪🇺",
    };
    InlineKeyboardMarkup::new(vec![
        Currency::ALL
            .into_iter()
            .map(|c| button(format!("{} {}", flag(c), c.code()), Action::Currency(c)))
            .collect::<Vec<_>>(),
    ])
}

pub(crate) fn ask_currency() -> Reply {
    Reply::with("Выберите вашу валюту:", currency_keyboard())
}

pub(crate) fn registered(user: &User) -> Reply {
    main_menu(format!(
        "✅ Регистрация завершена!\nИмя: {}\nВалюта: {}\n\nВыберите действие:",
        user.display_name,
        user.currency.code()
    ))
}

pub(crate) fn welcome_back(user: &User) -> Reply {
    main_menu(format!("С возвращением, {}! 😊", user.display_name))
}

pub(crate) fn main_menu(text: impl Into<String>) -> Reply {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            button("➕ Добавить расход", Action::Menu(MenuItem::Expense)),
            button("💰 Добавить доход", Action::Menu(MenuItem::Income)),
        ],
        vec![
            button("📊 Статистика", Action::Menu(MenuItem::Statistics)),
            button("🎯 Цели", Action::Menu(MenuItem::Goals)),
        ],
        vec![
            button("⚙️ Настройки", Action::Menu(MenuItem::Settings)),
            button("📘 О нас", Action::Menu(MenuItem::About)),
            button("🆘 Помощь", Action::Menu(MenuItem::Help)),
        ],
    ]);
    Reply::with(text, keyboard)
}

pub(crate) fn about() -> Reply {
    main_menu(
        "📘 Finance Keeper помогает вести личный бюджет прямо в Telegram: \
         записывайте доходы и расходы, ставьте финансовые цели и следите за статистикой.",
    )
}

pub(crate) fn help() -> Reply {
    main_menu(
        "🆘 Помощь\n\n\
         ➕/💰 Добавьте расход или доход: выберите категорию, введите сумму и описание.\n\
         📊 Статистика показывает баланс и расходы за выбранный период.\n\
         🎯 Цели: создавайте цели, пополняйте и снимайте средства.\n\n\
         Суммы вводятся числом: 150 или 99,90. Даты: ДД.ММ.ГГГГ.\n\
         /menu открывает главное меню, /cancel отменяет текущее действие.",
    )
}

pub(crate) fn cancelled() -> Reply {
    main_menu("🚫 Действие отменено")
}

pub(crate) fn mistake(message: &str) -> Reply {
    Reply::text(format!(
        "❌ {message}\nПопробуйте снова или нажмите /cancel для отмены"
    ))
}

pub(crate) fn use_buttons() -> Reply {
    Reply::text("Пожалуйста, воспользуйтесь кнопками выше или нажмите /cancel для отмены")
}

pub(crate) fn service_unavailable() -> Reply {
    main_menu("⚠️ Сервис временно недоступен. Попробуйте позже.")
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger entries
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn ask_category(kind: TransactionKind) -> Reply {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = categories(kind)
        .chunks(2)
        .enumerate()
        .map(|(row, pair)| {
            pair.iter()
                .enumerate()
                .map(|(col, (emoji, name))| {
                    button(
                        format!("{emoji} {name}"),
                        Action::Category(CategoryChoice::Preset(row * 2 + col)),
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![button(
        "✏️ Другая категория",
        Action::Category(CategoryChoice::Custom),
    )]);
    rows.push(back_row());

    let text = match kind {
        TransactionKind::Expense => "Выберите категорию расхода:",
        TransactionKind::Income => "Выберите категорию дохода:",
    };
    Reply::with(text, InlineKeyboardMarkup::new(rows))
}

pub(crate) fn ask_custom_category() -> Reply {
    Reply::text("Введите название категории:")
}

pub(crate) fn ask_amount(kind: TransactionKind, category: &str) -> Reply {
    let what = match kind {
        TransactionKind::Expense => "расхода",
        TransactionKind::Income => "дохода",
    };
    Reply::text(format!("Категория: {category}\nВведите сумму {what}:"))
}

pub(crate) fn ask_description() -> Reply {
    Reply::with(
        "Добавьте описание или нажмите «Пропустить»:",
        InlineKeyboardMarkup::new(vec![vec![button("⏭ Пропустить", Action::Skip)]]),
    )
}

pub(crate) fn entry_saved(tx: &NewTransaction, balance: Money, currency: Currency) -> Reply {
    let title = match tx.kind {
        TransactionKind::Expense => "✅ Расход успешно добавлен:",
        TransactionKind::Income => "✅ Доход успешно добавлен:",
    };
    main_menu(format!(
        "{title}\n• Категория: {}\n• Сумма: {}\n• Описание: {}\n\n💳 Текущий баланс: {}",
        tx.category,
        tx.amount.format(currency),
        tx.description.as_deref().unwrap_or("—"),
        balance.format(currency),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistics
// ─────────────────────────────────────────────────────────────────────────────

fn period_label(period: Period) -> &'static str {
    match period {
        Period::Today => "🌞 Сегодня",
        Period::Week => "📅 Эта неделя",
        Period::Month => "🌙 Этот месяц",
        Period::Year => "🎉 Этот год",
    }
}

pub(crate) fn ask_period() -> Reply {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Period::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|p| button(period_label(*p), Action::Period(*p)))
                .collect()
        })
        .collect();
    rows.push(back_row());
    Reply::with(
        "Выберите период для статистики:",
        InlineKeyboardMarkup::new(rows),
    )
}

pub(crate) fn statistics(
    period: Period,
    stats: &PeriodStatistics,
    currency: Currency,
    tz: Tz,
) -> Reply {
    let mut text = format!(
        "📊 Статистика: {}\n\n💰 Баланс: {}\n📈 Доходы: +{}\n📉 Расходы: -{}\n\n📌 Расходы по категориям:",
        period_label(period),
        stats.balance.format(currency),
        stats.total_income.format(currency),
        stats.total_expense.format(currency),
    );
    if stats.top_expense_categories.is_empty() {
        text.push_str("\nНет данных");
    }
    for (category, total) in &stats.top_expense_categories {
        text.push_str(&format!("\n• {category}: {}", total.format(currency)));
    }

    text.push_str("\n\n📜 Последние транзакции:");
    if stats.recent_transactions.is_empty() {
        text.push_str("\nНет записей");
    }
    for tx in &stats.recent_transactions {
        let signed = tx.signed_amount();
        let plus = if signed.is_positive() { "+" } else { "" };
        text.push_str(&format!(
            "\n{} {plus}{} • {}{}",
            tx.occurred_at.with_timezone(&tz).format("%d.%m %H:%M"),
            signed.format(currency),
            tx.category,
            tx.description
                .as_deref()
                .map(|d| format!(" • {d}"))
                .unwrap_or_default(),
        ));
    }

    main_menu(text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Goals
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn goals_menu(text: impl Into<String>) -> Reply {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            button("➕ Создать цель", Action::Goals(GoalsItem::Create)),
            button("✏️ Редактировать цель", Action::Goals(GoalsItem::Edit)),
        ],
        vec![
            button("💰 Внести сумму", Action::Goals(GoalsItem::Fund)),
            button("📉 Снять сумму", Action::Goals(GoalsItem::Withdraw)),
        ],
        vec![
            button(
                "📈 Активные цели",
                Action::Goals(GoalsItem::List(GoalFilter::Active)),
            ),
            button(
                "✅ Выполненные",
                Action::Goals(GoalsItem::List(GoalFilter::Completed)),
            ),
            button(
                "❌ Проваленные",
                Action::Goals(GoalsItem::List(GoalFilter::Failed)),
            ),
        ],
        vec![button("🗑 Удалить цель", Action::Goals(GoalsItem::Delete))],
        back_row(),
    ]);
    Reply::with(text, keyboard)
}

pub(crate) fn goals_home() -> Reply {
    goals_menu("🎯 Управление целями\nВыберите действие:")
}

pub(crate) fn ask_goal_name() -> Reply {
    Reply::text("Введите название цели (от 3 символов):")
}

pub(crate) fn ask_goal_target() -> Reply {
    Reply::text("Введите целевую сумму:")
}

pub(crate) fn ask_goal_deadline() -> Reply {
    Reply::with(
        "Введите дедлайн в формате ДД.ММ.ГГГГ или нажмите «Пропустить»:",
        InlineKeyboardMarkup::new(vec![vec![button("⏭ Пропустить", Action::Skip)]]),
    )
}

pub(crate) fn goal_created(goal: &Goal, currency: Currency, today: NaiveDate) -> Reply {
    goals_menu(format!(
        "✅ Цель успешно создана!\n\n{}",
        goal_details(goal, currency, today)
    ))
}

fn status_label(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::Active => "активна",
        GoalStatus::Completed => "выполнена ✅",
        GoalStatus::Failed => "провалена ❌",
    }
}

/// Card of a single goal.
pub(crate) fn goal_details(goal: &Goal, currency: Currency, today: NaiveDate) -> String {
    let mut text = format!(
        "🎯 {}\n💰 Баланс: {} / {}\n📊 Прогресс: {}%\n📅 Дедлайн: {}",
        goal.name,
        goal.current_amount.format(currency),
        goal.target_amount.format(currency),
        goal.progress_percent(),
        goal.deadline
            .map(format_date)
            .unwrap_or_else(|| "Не задан".to_string()),
    );
    if goal.is_active()
        && let Some(days) = goal.days_left(today)
    {
        if days >= 0 {
            text.push_str(&format!("\n⏳ До дедлайна: {days} дн."));
        } else {
            text.push_str(&format!("\n⏳ Просрочено на {} дн.", -days));
        }
    }
    if !goal.is_active() {
        text.push_str(&format!("\nСтатус: {}", status_label(goal.status)));
    }
    text
}

fn filter_title(filter: GoalFilter) -> &'static str {
    match filter {
        GoalFilter::Active => "📈 Активные цели",
        GoalFilter::Completed => "✅ Выполненные цели",
        GoalFilter::Failed => "❌ Проваленные цели",
        GoalFilter::All => "🎯 Все цели",
    }
}

pub(crate) fn goals_list(
    filter: GoalFilter,
    goals: &[Goal],
    currency: Currency,
    today: NaiveDate,
) -> Reply {
    if goals.is_empty() {
        let empty = match filter {
            GoalFilter::Active => "❌ Нет активных целей",
            GoalFilter::Completed => "❌ Нет выполненных целей",
            GoalFilter::Failed => "❌ Нет проваленных целей",
            GoalFilter::All => "❌ У вас пока нет целей",
        };
        return goals_menu(empty);
    }
    let cards: Vec<String> = goals
        .iter()
        .map(|g| goal_details(g, currency, today))
        .collect();
    goals_menu(format!("{}:\n\n{}", filter_title(filter), cards.join("\n\n")))
}

pub(crate) fn no_goals_for(purpose: GoalPurpose) -> Reply {
    match purpose {
        GoalPurpose::Delete => goals_menu("❌ У вас пока нет целей"),
        _ => goals_menu("❌ Нет активных целей"),
    }
}

/// One button per goal; the name can also be typed.
pub(crate) fn goal_picker(goals: &[Goal]) -> Reply {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = goals
        .iter()
        .map(|g| vec![button(g.name.clone(), Action::PickGoal(g.id))])
        .collect();
    rows.push(goals_back_row());
    Reply::with(
        "Выберите цель (или введите её название):",
        InlineKeyboardMarkup::new(rows),
    )
}

pub(crate) fn ask_goal_amount(op: AmountOp, goal: &Goal, currency: Currency) -> Reply {
    let text = match op {
        AmountOp::Fund => format!(
            "🎯 {}\nОсталось накопить: {}\nВведите сумму пополнения:",
            goal.name,
            goal.remaining().format(currency)
        ),
        AmountOp::Withdraw => format!(
            "🎯 {}\nДоступно: {}\nВведите сумму для снятия:",
            goal.name,
            goal.current_amount.format(currency)
        ),
    };
    Reply::text(text)
}

pub(crate) fn funded(goal: &Goal, amount: Money, funding: Funding, currency: Currency) -> Reply {
    let mut text = format!(
        "✅ Успешно внесено {}!\n💰 Баланс цели «{}»: {} / {}",
        amount.format(currency),
        goal.name,
        funding.current_amount.format(currency),
        goal.target_amount.format(currency),
    );
    if funding.completed_just_now {
        text.push_str("\n\n🎉 Поздравляем! Цель достигнута!");
    }
    goals_menu(text)
}

pub(crate) fn withdrawn(amount: Money, current: Money, currency: Currency) -> Reply {
    goals_menu(format!(
        "✅ Успешно снято: {}\n💰 Новый баланс: {}",
        amount.format(currency),
        current.format(currency),
    ))
}

pub(crate) fn confirm_delete(goal: &Goal) -> Reply {
    Reply::with(
        format!("❓ Удалить цель '{}'?", goal.name),
        InlineKeyboardMarkup::new(vec![vec![
            button("✅ Да, удалить", Action::Confirm(true)),
            button("❌ Нет, отменить", Action::Confirm(false)),
        ]]),
    )
}

pub(crate) fn goal_deleted() -> Reply {
    goals_menu("✅ Цель успешно удалена!")
}

pub(crate) fn edit_menu(goal: &Goal, currency: Currency, today: NaiveDate) -> Reply {
    Reply::with(
        format!(
            "{}\n\nЧто хотите изменить?",
            goal_details(goal, currency, today)
        ),
        InlineKeyboardMarkup::new(vec![
            vec![button("📝 Изменить название", Action::Edit(EditField::Name))],
            vec![button("💵 Изменить сумму", Action::Edit(EditField::Target))],
            vec![button("📅 Изменить дедлайн", Action::Edit(EditField::Deadline))],
            vec![button(
                "🚫 Отменить редактирование",
                Action::Edit(EditField::Cancel),
            )],
        ]),
    )
}

pub(crate) fn ask_new_name() -> Reply {
    Reply::text("Введите новое название цели:")
}

pub(crate) fn ask_new_target() -> Reply {
    Reply::text("Введите новую целевую сумму:")
}

pub(crate) fn ask_new_deadline() -> Reply {
    Reply::text("Введите новый дедлайн в формате ДД.ММ.ГГГГ:")
}

pub(crate) fn goal_updated(goal: &Goal, currency: Currency, today: NaiveDate) -> Reply {
    goals_menu(format!(
        "✅ Цель обновлена!\n\n{}",
        goal_details(goal, currency, today)
    ))
}

pub(crate) fn goal_failed() -> Reply {
    goals_menu("❌ Цель отмечена как проваленная")
}

/// Goals whose deadline passed, each with its own set of choices.
pub(crate) fn expired_goals(goals: &[Goal], currency: Currency, today: NaiveDate) -> Reply {
    let mut text = String::from(
        "⏰ У некоторых целей истёк срок:\n\
         🔄 продлить срок, ❌ отметить как проваленную, 🗑 удалить\n",
    );
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for goal in goals {
        text.push('\n');
        text.push_str(&goal_details(goal, currency, today));
        text.push('\n');
        rows.push(vec![
            button(
                format!("🔄 {}", goal.name),
                Action::Expired(ExpiredChoice::Extend, goal.id),
            ),
            button(
                format!("❌ {}", goal.name),
                Action::Expired(ExpiredChoice::Fail, goal.id),
            ),
            button(
                format!("🗑 {}", goal.name),
                Action::Expired(ExpiredChoice::Delete, goal.id),
            ),
        ]);
    }
    rows.push(vec![button(
        "🔁 Оставить как есть",
        Action::Goals(GoalsItem::List(GoalFilter::Active)),
    )]);
    Reply::with(text, InlineKeyboardMarkup::new(rows))
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn settings(user: &User) -> Reply {
    let mut rows = currency_keyboard().inline_keyboard;
    rows.push(back_row());
    Reply::with(
        format!(
            "⚙️ Настройки\nИмя: {}\nВалюта: {}\n\nВыберите новую валюту:",
            user.display_name,
            user.currency.code()
        ),
        InlineKeyboardMarkup::new(rows),
    )
}

pub(crate) fn currency_changed(currency: Currency) -> Reply {
    main_menu(format!("✅ Валюта изменена на {}", currency.code()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine errors
// ─────────────────────────────────────────────────────────────────────────────

/// User-facing text of an engine failure that the user can act on.
pub(crate) fn engine_error(err: &EngineError, currency: Currency) -> String {
    match err {
        EngineError::InsufficientFunds { available } => {
            format!("Недостаточно средств. Доступно: {}", available.format(currency))
        }
        EngineError::InvalidAmount(_) => "Сумма указана некорректно.".to_string(),
        EngineError::InvalidName(_) => "Некорректное название.".to_string(),
        EngineError::PastDeadline(_) => "Дата не может быть в прошлом!".to_string(),
        EngineError::TargetBelowSaved { saved, .. } => format!(
            "Целевая сумма не может быть меньше уже накопленной ({}).",
            saved.format(currency)
        ),
        EngineError::InvalidGoal(_) => "Операция недоступна для этой цели.".to_string(),
        err if err.kind() == ErrorKind::NotFound => "Цель не найдена".to_string(),
        _ => "Не удалось выполнить операцию.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use engine::Transaction;

    use super::*;

    fn goal(current: i64, target: i64, deadline: Option<NaiveDate>) -> Goal {
        Goal {
            id: 1,
            user_id: 7,
            name: "Отпуск".to_string(),
            target_amount: Money::new(target),
            current_amount: Money::new(current),
            deadline,
            status: GoalStatus::Active,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            version: 0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn callback_data(reply: &Reply) -> Vec<String> {
        reply
            .keyboard
            .iter()
            .flat_map(|kb| kb.inline_keyboard.iter().flatten())
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                    Some(data.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn every_button_decodes_to_an_action() {
        let g = goal(0, 100_000, None);
        let replies = [
            main_menu("x"),
            ask_currency(),
            ask_category(TransactionKind::Expense),
            ask_category(TransactionKind::Income),
            ask_description(),
            ask_period(),
            goals_home(),
            goal_picker(std::slice::from_ref(&g)),
            confirm_delete(&g),
            edit_menu(&g, Currency::Rub, day(2026, 6, 1)),
            expired_goals(std::slice::from_ref(&g), Currency::Rub, day(2026, 6, 1)),
        ];
        for reply in &replies {
            for data in callback_data(reply) {
                assert!(Action::parse(&data).is_some(), "{data}");
            }
        }
    }

    #[test]
    fn category_buttons_map_to_presets() {
        let data = callback_data(&ask_category(TransactionKind::Income));
        assert!(data.contains(&"cat:4".to_string()));
        assert!(data.contains(&"cat:custom".to_string()));
        assert_eq!(preset_category(TransactionKind::Income, 4), Some("Самозанятость"));
        assert_eq!(preset_category(TransactionKind::Expense, 5), None);
    }

    #[test]
    fn goal_card_shows_progress_and_days_left() {
        let today = day(2026, 6, 1);
        let card = goal(25_000, 100_000, Some(day(2026, 6, 11)));
        let text = goal_details(&card, Currency::Rub, today);
        assert!(text.contains("💰 Баланс: 250.00 ₽ / 1000.00 ₽"));
        assert!(text.contains("📊 Прогресс: 25%"));
        assert!(text.contains("📅 Дедлайн: 11.06.2026"));
        assert!(text.contains("До дедлайна: 10 дн."));

        let text = goal_details(&goal(0, 100, Some(day(2026, 5, 30))), Currency::Rub, today);
        assert!(text.contains("Просрочено на 2 дн."));

        let text = goal_details(&goal(500, 100, None), Currency::Usd, today);
        assert!(text.contains("📊 Прогресс: 100%"));
        assert!(text.contains("Не задан"));
    }

    #[test]
    fn statistics_render_empty_sections() {
        let reply = statistics(
            Period::Today,
            &PeriodStatistics::default(),
            Currency::Rub,
            chrono_tz::UTC,
        );
        assert!(reply.text.contains("💰 Баланс: 0.00 ₽"));
        assert!(reply.text.contains("Нет данных"));
        assert!(reply.text.contains("Нет записей"));
    }

    #[test]
    fn statistics_list_categories_and_recent_rows() {
        let stats = PeriodStatistics {
            balance: Money::new(80_000),
            total_income: Money::new(100_000),
            total_expense: Money::new(20_000),
            top_expense_categories: vec![("Еда".to_string(), Money::new(20_000))],
            recent_transactions: vec![Transaction {
                id: 1,
                user_id: 7,
                kind: TransactionKind::Expense,
                amount: Money::new(20_000),
                category: "Еда".to_string(),
                description: Some("обед".to_string()),
                occurred_at: Utc::now(),
            }],
        };
        let text = statistics(Period::Month, &stats, Currency::Rub, chrono_tz::UTC).text;
        assert!(text.contains("📈 Доходы: +1000.00 ₽"));
        assert!(text.contains("📉 Расходы: -200.00 ₽"));
        assert!(text.contains("• Еда: 200.00 ₽"));
        assert!(text.contains("-200.00 ₽ • Еда • обед"));
    }

    #[test]
    fn insufficient_funds_names_the_available_amount() {
        let err = EngineError::InsufficientFunds {
            available: Money::new(1_000),
        };
        assert_eq!(
            engine_error(&err, Currency::Eur),
            "Недостаточно средств. Доступно: 10.00 €"
        );
        let err = EngineError::KeyNotFound("goal 3".to_string());
        assert_eq!(engine_error(&err, Currency::Eur), "Цель не найдена");
    }

    #[test]
    fn goal_rule_errors_get_their_own_text() {
        let err = EngineError::PastDeadline(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(
            engine_error(&err, Currency::Rub),
            "Дата не может быть в прошлом!"
        );

        let err = EngineError::TargetBelowSaved {
            target: Money::new(5_000),
            saved: Money::new(7_550),
        };
        assert_eq!(
            engine_error(&err, Currency::Rub),
            "Целевая сумма не может быть меньше уже накопленной (75.50 ₽)."
        );

        let err = EngineError::InvalidGoal("goal is completed".to_string());
        assert_eq!(
            engine_error(&err, Currency::Rub),
            "Операция недоступна для этой цели."
        );
    }
}
