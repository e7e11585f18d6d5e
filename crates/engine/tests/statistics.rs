use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::Database;

use engine::{Currency, Engine, EngineError, Money, NewTransaction, PeriodStatistics};
use migration::MigratorTrait;

const ALICE: i64 = 1001;
const BOB: i64 = 2002;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .upsert_user(ALICE, "Alice", Currency::Rub)
        .await
        .unwrap();
    engine.upsert_user(BOB, "Bob", Currency::Rub).await.unwrap();
    engine
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, day, hour, 0, 0).unwrap()
}

async fn expense(engine: &Engine, user: i64, minor: i64, category: &str, when: DateTime<Utc>) {
    engine
        .record_transaction(
            user,
            NewTransaction::expense(Money::new(minor), category).occurred_at(when),
        )
        .await
        .unwrap();
}

async fn income(engine: &Engine, user: i64, minor: i64, category: &str, when: DateTime<Utc>) {
    engine
        .record_transaction(
            user,
            NewTransaction::income(Money::new(minor), category).occurred_at(when),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn top_categories_merge_rows_of_one_category() {
    let engine = engine_with_db().await;
    expense(&engine, ALICE, 10_000, "A", at(10, 9)).await;
    expense(&engine, ALICE, 5_000, "B", at(10, 10)).await;
    expense(&engine, ALICE, 3_000, "A", at(10, 11)).await;

    let stats = engine
        .statistics_for_period(ALICE, at(10, 0), at(10, 23))
        .await
        .unwrap();
    assert_eq!(
        stats.top_expense_categories,
        vec![
            ("A".to_string(), Money::new(13_000)),
            ("B".to_string(), Money::new(5_000)),
        ]
    );
    assert_eq!(stats.total_expense, Money::new(18_000));
    assert_eq!(stats.total_income, Money::ZERO);
    assert_eq!(stats.balance, Money::new(-18_000));
}

#[tokio::test]
async fn window_is_inclusive_and_per_user() {
    let engine = engine_with_db().await;
    income(&engine, ALICE, 100_000, "Salary", at(1, 0)).await;
    expense(&engine, ALICE, 2_500, "Food", at(15, 12)).await;
    expense(&engine, ALICE, 700, "Transport", at(31, 23)).await;
    expense(&engine, ALICE, 9_900, "Food", at(31, 23) + Duration::seconds(1)).await;
    income(&engine, BOB, 555_500, "Salary", at(15, 12)).await;

    let stats = engine
        .statistics_for_period(ALICE, at(1, 0), at(31, 23))
        .await
        .unwrap();
    assert_eq!(stats.total_income, Money::new(100_000));
    assert_eq!(stats.total_expense, Money::new(3_200));
    assert_eq!(stats.balance, Money::new(96_800));
    assert_eq!(stats.recent_transactions.len(), 3);
    assert!(stats.recent_transactions.iter().all(|tx| tx.user_id == ALICE));
}

#[tokio::test]
async fn top_lists_are_capped_at_five() {
    let engine = engine_with_db().await;
    let categories = ["Food", "Housing", "Transport", "Fun", "Shopping", "Health", "Pets"];
    for (i, category) in categories.iter().enumerate() {
        let minor = 1_000 * (i as i64 + 1);
        expense(&engine, ALICE, minor, category, at(5, i as u32)).await;
    }

    let stats = engine
        .statistics_for_period(ALICE, at(1, 0), at(30, 0))
        .await
        .unwrap();
    let top: Vec<&str> = stats
        .top_expense_categories
        .iter()
        .map(|(category, _)| category.as_str())
        .collect();
    assert_eq!(top, vec!["Pets", "Health", "Shopping", "Fun", "Transport"]);

    let recent: Vec<&str> = stats
        .recent_transactions
        .iter()
        .map(|tx| tx.category.as_str())
        .collect();
    assert_eq!(recent, vec!["Pets", "Health", "Shopping", "Fun", "Transport"]);
}

#[tokio::test]
async fn ties_keep_first_inserted_order() {
    let engine = engine_with_db().await;
    expense(&engine, ALICE, 1_000, "Second", at(3, 12)).await;
    expense(&engine, ALICE, 1_000, "First", at(3, 10)).await;
    expense(&engine, ALICE, 1_000, "Third", at(3, 12)).await;

    let stats = engine
        .statistics_for_period(ALICE, at(3, 0), at(3, 23))
        .await
        .unwrap();
    let top: Vec<&str> = stats
        .top_expense_categories
        .iter()
        .map(|(category, _)| category.as_str())
        .collect();
    assert_eq!(top, vec!["Second", "First", "Third"]);

    // Same timestamp: the later insert comes first.
    let recent: Vec<&str> = stats
        .recent_transactions
        .iter()
        .map(|tx| tx.category.as_str())
        .collect();
    assert_eq!(recent, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn empty_window_is_a_zero_report() {
    let engine = engine_with_db().await;
    income(&engine, ALICE, 1_000, "Gift", at(20, 0)).await;

    let stats = engine
        .statistics_for_period(ALICE, at(1, 0), at(2, 0))
        .await
        .unwrap();
    assert_eq!(stats, PeriodStatistics::default());
    assert!(stats.is_empty());
}

#[tokio::test]
async fn reversed_window_is_rejected() {
    let engine = engine_with_db().await;
    let err = engine
        .statistics_for_period(ALICE, at(2, 0), at(1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPeriod(_)));
}

#[tokio::test]
async fn sub_second_bounds_match_stored_seconds() {
    let engine = engine_with_db().await;
    expense(&engine, ALICE, 1_500, "Food", at(7, 12)).await;

    let just_after = at(7, 12) + Duration::milliseconds(400);
    let stats = engine
        .statistics_for_period(ALICE, at(7, 0), just_after)
        .await
        .unwrap();
    assert_eq!(stats.total_expense, Money::new(1_500));

    let stats = engine
        .statistics_for_period(ALICE, just_after, at(7, 23))
        .await
        .unwrap();
    assert!(stats.is_empty());
}
