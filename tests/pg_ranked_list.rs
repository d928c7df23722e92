// tests/pg_ranked_list.rs
//
// The ranked list against a live Postgres: per-row descending shifts under
// the UNIQUE (position) constraint, the advisory lock across separate pools
// and error mapping of constraint violations.
//
// Every test is ignored by default and needs a disposable database:
//   DATABASE_URL=postgres://localhost/newsdesk_test \
//     cargo test --test pg_ranked_list -- --ignored
// The tests truncate `top_news` and `activity_log`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::Mutex;

use newsdesk::models::{
    activity::{ActionKind, NewActivity},
    error::Error,
    media::MediaKind,
    top_news::{TopNewsChanges, TopNewsDraft},
};
use newsdesk::services::{
    activity::{ActivityLog, PgActivityLog},
    media::MediaStore,
    ranked_list::RankedListManager,
};
use newsdesk::store::{PgTopNewsStore, TopNewsStore, TopNewsTx};

const ACTOR: &str = "editor-pg";

// The tests share one database, so they take turns.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

struct NoMedia;

#[async_trait]
impl MediaStore for NoMedia {
    async fn release(&self, _: MediaKind, _: &str) -> Result<(), Error> {
        Ok(())
    }
}

async fn connect(max_connections: u32) -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

async fn reset(pool: &PgPool) {
    sqlx::query("TRUNCATE top_news, activity_log")
        .execute(pool)
        .await
        .expect("truncate");
}

fn manager(pool: &PgPool) -> Arc<RankedListManager> {
    Arc::new(RankedListManager::new(
        Arc::new(PgTopNewsStore::new(pool.clone())),
        Arc::new(NoMedia),
        Arc::new(PgActivityLog::new(pool.clone())),
    ))
}

fn draft(position: i64, headline: &str) -> TopNewsDraft {
    TopNewsDraft {
        position: Some(position),
        headline: Some(headline.to_string()),
        summary: Some(format!("{headline} summary")),
        category: Some("economy".to_string()),
        ..Default::default()
    }
}

async fn layout(pool: &PgPool) -> Vec<(String, i32)> {
    PgTopNewsStore::new(pool.clone())
        .list(i64::MAX)
        .await
        .expect("list")
        .into_iter()
        .map(|e| (e.headline, e.position))
        .collect()
}

fn pairs(items: &[(&str, i32)]) -> Vec<(String, i32)> {
    items.iter().map(|(h, p)| (h.to_string(), *p)).collect()
}

#[tokio::test]
#[ignore] // run manually: DATABASE_URL=... cargo test --test pg_ranked_list -- --ignored
async fn insert_and_move_shift_rows_one_at_a_time() {
    let _turn = DB_LOCK.lock().await;
    let Some(pool) = connect(2).await else { return };
    reset(&pool).await;
    let m = manager(&pool);

    for p in 1..=3 {
        m.insert(ACTOR, draft(p, &format!("item {p}"))).await.unwrap();
    }
    m.insert(ACTOR, draft(2, "breaking")).await.unwrap();
    assert_eq!(
        layout(&pool).await,
        pairs(&[("item 1", 1), ("breaking", 2), ("item 2", 3), ("item 3", 4)])
    );

    // item 3 sits at 4; moving it onto 2 parks it, shifts 2..=3 and lands it.
    let item3 = PgTopNewsStore::new(pool.clone())
        .list(i64::MAX)
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.headline == "item 3")
        .unwrap();
    let moved = m
        .update(
            ACTOR,
            item3.id,
            TopNewsChanges {
                position: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.position, 2);
    assert_eq!(
        layout(&pool).await,
        pairs(&[("item 1", 1), ("item 3", 2), ("breaking", 3), ("item 2", 4)])
    );
}

#[tokio::test]
#[ignore] // run manually: DATABASE_URL=... cargo test --test pg_ranked_list -- --ignored
async fn delete_leaves_a_gap_and_is_logged() {
    let _turn = DB_LOCK.lock().await;
    let Some(pool) = connect(2).await else { return };
    reset(&pool).await;
    let m = manager(&pool);

    let mut ids = Vec::new();
    for p in 1..=3 {
        ids.push(m.insert(ACTOR, draft(p, &format!("item {p}"))).await.unwrap().id);
    }
    m.delete(ACTOR, ids[1]).await.unwrap();

    assert_eq!(layout(&pool).await, pairs(&[("item 1", 1), ("item 3", 3)]));
    let err = m.get_by_id(ids[1]).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let recent = PgActivityLog::new(pool.clone()).recent(1).await.unwrap();
    assert_eq!(recent[0].action, ActionKind::Delete);
    assert_eq!(recent[0].target, Some(ids[1].to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // run manually: DATABASE_URL=... cargo test --test pg_ranked_list -- --ignored
async fn concurrent_inserts_across_pools_keep_positions_unique() {
    let _turn = DB_LOCK.lock().await;
    let Some(first) = connect(4).await else { return };
    let Some(second) = connect(4).await else { return };
    reset(&first).await;

    // Two pools stand in for two service instances sharing the database.
    let managers = [manager(&first), manager(&second)];
    managers[0].insert(ACTOR, draft(1, "seed")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let m = managers[i % 2].clone();
        handles.push(tokio::spawn(async move {
            m.insert(ACTOR, draft(1, &format!("racer {i}"))).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("insert");
    }

    let positions: Vec<i32> = layout(&first).await.into_iter().map(|(_, p)| p).collect();
    let unique: HashSet<i32> = positions.iter().copied().collect();
    assert_eq!(unique.len(), positions.len());
    assert_eq!(positions, (1..=9).collect::<Vec<i32>>());
}

#[tokio::test]
#[ignore] // run manually: DATABASE_URL=... cargo test --test pg_ranked_list -- --ignored
async fn duplicate_position_write_is_a_conflict() {
    let _turn = DB_LOCK.lock().await;
    let Some(pool) = connect(2).await else { return };
    reset(&pool).await;
    let store = PgTopNewsStore::new(pool.clone());
    manager(&pool).insert(ACTOR, draft(1, "taken")).await.unwrap();

    // Bypass the manager's shifting so the constraint itself fires.
    let mut tx = store.begin().await.unwrap();
    let clash = draft(1, "clash").into_entry().unwrap();
    let err = tx.insert(&clash).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
    assert!(err.is_retryable());
    drop(tx);

    assert_eq!(layout(&pool).await, pairs(&[("taken", 1)]));
}

#[tokio::test]
#[ignore] // run manually: DATABASE_URL=... cargo test --test pg_ranked_list -- --ignored
async fn shift_overflow_rolls_back_the_transaction() {
    let _turn = DB_LOCK.lock().await;
    let Some(pool) = connect(2).await else { return };
    reset(&pool).await;
    let m = manager(&pool);

    let top = i64::from(i32::MAX);
    m.insert(ACTOR, draft(top, "top")).await.unwrap();
    m.insert(ACTOR, draft(top - 1, "below")).await.unwrap();
    let before = layout(&pool).await;

    let err = m.insert(ACTOR, draft(top - 1, "overflow")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(layout(&pool).await, before);
}

#[tokio::test]
#[ignore] // run manually: DATABASE_URL=... cargo test --test pg_ranked_list -- --ignored
async fn activity_log_reads_newest_first() {
    let _turn = DB_LOCK.lock().await;
    let Some(pool) = connect(2).await else { return };
    reset(&pool).await;
    let log = PgActivityLog::new(pool.clone());

    for (action, target) in [(ActionKind::Create, "a"), (ActionKind::Update, "b")] {
        log.record(NewActivity {
            actor_id: ACTOR.to_string(),
            action,
            target: Some(target.to_string()),
            details: None,
            category: Some("economy".to_string()),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let recent = log.recent(10).await.unwrap();
    let targets: Vec<_> = recent.iter().filter_map(|e| e.target.as_deref()).collect();
    assert_eq!(targets, vec!["b", "a"]);
    assert_eq!(recent[0].action, ActionKind::Update);
}
