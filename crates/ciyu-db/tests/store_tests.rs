use chrono::Duration;
use ciyu_db::{PracticeStore, StoreError, models::Language};
use ciyu_srs::LearningState;
use uuid::Uuid;

use crate::common::{answer, base_time, pg_store, record, session};

#[tokio::test]
async fn test_review_record_upsert_last_write_wins() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user_id = Uuid::new_v4();

    let mut first = record(user_id, "xuexi", base_time());
    store.upsert_review_record(&first).await.unwrap();
    first.repetition_count = 2;
    first.interval_days = 6;
    first.learning_state = LearningState::Review;
    store.upsert_review_record(&first).await.unwrap();

    let loaded = store.load_review_record(&first.key()).await.unwrap().unwrap();
    assert_eq!(loaded, first);

    let mut missing = first.key();
    missing.word_id = "pengyou".to_string();
    assert!(store.load_review_record(&missing).await.unwrap().is_none());
}

#[tokio::test]
async fn test_due_records_ordered_and_scoped() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();
    let now = base_time();

    for (owner, word_id, offset) in [
        (user_id, "b-tied", -2),
        (user_id, "a-tied", -2),
        (user_id, "older", -5),
        (user_id, "exact", 0),
        (user_id, "future", 3),
        (other_user, "theirs", -9),
    ] {
        let due_at = now + Duration::days(offset);
        store.upsert_review_record(&record(owner, word_id, due_at)).await.unwrap();
    }

    let due = store
        .list_due_review_records(user_id, Language::Mandarin, "hsk2", now)
        .await
        .unwrap();
    let ids: Vec<_> = due.iter().map(|r| r.word_id.as_str()).collect();
    assert_eq!(ids, vec!["older", "a-tied", "b-tied", "exact"]);

    let all = store
        .list_review_records(user_id, Language::Mandarin, "hsk2")
        .await
        .unwrap();
    assert_eq!(all.len(), 5);

    let other_scope = store
        .list_review_records(user_id, Language::Cantonese, "hsk2")
        .await
        .unwrap();
    assert!(other_scope.is_empty());
}

#[tokio::test]
async fn test_session_round_trip_and_answer_order() {
    let Some(store) = pg_store().await else {
        return;
    };
    let practice = session(Uuid::new_v4());

    let id = store.create_session(&practice).await.unwrap();
    assert_eq!(id, practice.id);
    assert_eq!(store.load_session(id).await.unwrap(), Some(practice.clone()));

    // Same timestamp for every answer; recording order must still hold.
    for word_id in ["w0", "w1", "w2"] {
        store
            .append_answer_event(id, "pinyin_choice", &answer(word_id, 0))
            .await
            .unwrap();
    }
    store
        .append_answer_event(id, "pronunciation", &answer("w3", 1))
        .await
        .unwrap();

    let events = store.list_answer_events(id).await.unwrap();
    let order: Vec<_> = events.iter().map(|e| e.event.word_id.as_str()).collect();
    assert_eq!(order, vec!["w0", "w1", "w2", "w3"]);
    assert!(events.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert_eq!(events[3].exercise_type, "pronunciation");
    assert!(store.load_session(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_double_close_keeps_first_result() {
    let Some(store) = pg_store().await else {
        return;
    };
    let practice = session(Uuid::new_v4());
    let id = store.create_session(&practice).await.unwrap();
    let finished_at = base_time() + Duration::minutes(3);

    store.close_session(id, 4, 180, finished_at).await.unwrap();
    let second = store
        .close_session(id, 5, 10, finished_at + Duration::minutes(1))
        .await;

    assert!(matches!(second, Err(StoreError::SessionClosed)));
    let stored = store.load_session(id).await.unwrap().unwrap();
    assert_eq!(stored.score, Some(4));
    assert_eq!(stored.duration_seconds, Some(180));
    assert_eq!(stored.completed_at, Some(finished_at));
}

#[tokio::test]
async fn test_append_after_close_is_rejected() {
    let Some(store) = pg_store().await else {
        return;
    };
    let practice = session(Uuid::new_v4());
    let id = store.create_session(&practice).await.unwrap();
    store
        .append_answer_event(id, "pinyin_choice", &answer("w0", 0))
        .await
        .unwrap();
    store.close_session(id, 1, 30, base_time()).await.unwrap();

    let late = store
        .append_answer_event(id, "pinyin_choice", &answer("w1", 5))
        .await;

    assert!(matches!(late, Err(StoreError::SessionClosed)));
    assert_eq!(store.list_answer_events(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let Some(store) = pg_store().await else {
        return;
    };
    let unknown = Uuid::new_v4();

    let append = store
        .append_answer_event(unknown, "pinyin_choice", &answer("w0", 0))
        .await;
    assert!(matches!(append, Err(StoreError::NotFound)));

    let close = store.close_session(unknown, 0, 0, base_time()).await;
    assert!(matches!(close, Err(StoreError::NotFound)));
}
