// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Set FIRESTORE_EMULATOR_HOST before running them.
//!
//! The emulator provides a clean state for each test run.

use rehab_tracker::models::chat::room_id_for;
use rehab_tracker::models::{
    AthleteProfile, ChatMessage, Exercise, ExerciseStatus, MessageKind, PhysioProfile, SymptomLog,
};

mod common;
use common::test_db;

/// Generate a unique uid for test isolation.
fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

fn test_exercise(exercise_id: &str, athlete_id: &str, completion_date: &str) -> Exercise {
    Exercise {
        exercise_id: exercise_id.to_string(),
        athlete_id: athlete_id.to_string(),
        assigned_by: "pt-test".to_string(),
        title: format!("Exercise {}", exercise_id),
        timer_minutes: 5,
        media_url: format!("exercises/{}/1700000000000", athlete_id),
        completion_date: completion_date.to_string(),
        status: ExerciseStatus::Upcoming,
        feedback: None,
        pain_level: None,
        rating: None,
        created_at: "2026-01-01T00:00:00.000Z".to_string(),
    }
}

fn test_log(log_id: &str, athlete_id: &str, timestamp: &str) -> SymptomLog {
    SymptomLog {
        log_id: log_id.to_string(),
        athlete_id: athlete_id.to_string(),
        symptom_description: "knee pain".to_string(),
        pain_level: 6,
        media_url: None,
        media_type: None,
        timestamp: timestamp.to_string(),
    }
}

fn test_message(message_id: &str, room_id: &str, sender_id: &str, timestamp: &str) -> ChatMessage {
    ChatMessage {
        message_id: message_id.to_string(),
        room_id: room_id.to_string(),
        sender_id: sender_id.to_string(),
        timestamp: timestamp.to_string(),
        kind: MessageKind::Text,
        text: Some(format!("message {}", message_id)),
        file_url: None,
        file_name: None,
        voice_url: None,
    }
}

#[tokio::test]
async fn test_athlete_profile_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("ath");

    let before = db.get_athlete(&uid).await.unwrap();
    assert!(before.is_none(), "Profile should not exist before creation");

    let profile = AthleteProfile {
        uid: uid.clone(),
        name: "Jonas".to_string(),
        email: "jonas@example.com".to_string(),
        age: 24,
        sport: "Climbing".to_string(),
        created_at: "2026-01-15T10:00:00.000Z".to_string(),
    };
    db.upsert_athlete(&profile).await.unwrap();

    let fetched = db.get_athlete(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Jonas");
    assert_eq!(fetched.age, 24);
    assert_eq!(fetched.sport, "Climbing");

    // Upsert overwrites in place
    let updated = AthleteProfile {
        sport: "Bouldering".to_string(),
        ..profile
    };
    db.upsert_athlete(&updated).await.unwrap();
    let fetched = db.get_athlete(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.sport, "Bouldering");

    println!("✓ Athlete profile roundtrip verified: uid={}", uid);
}

#[tokio::test]
async fn test_physio_profile_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("pt");

    let profile = PhysioProfile {
        uid: uid.clone(),
        name: "Maren".to_string(),
        email: "maren@example.com".to_string(),
        specialization: "Sports rehabilitation".to_string(),
        license_number: "PT-1234".to_string(),
        created_at: "2026-01-15T10:00:00.000Z".to_string(),
    };
    db.upsert_physio(&profile).await.unwrap();

    let fetched = db.get_physio(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.specialization, "Sports rehabilitation");
    assert_eq!(fetched.license_number, "PT-1234");

    // Profiles live in separate collections per role
    let cross = db.get_athlete(&uid).await.unwrap();
    assert!(cross.is_none(), "Physio uid must not appear as an athlete");

    println!("✓ Physio profile roundtrip verified: uid={}", uid);
}

#[tokio::test]
async fn test_exercises_ordered_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let athlete_id = unique_uid("ath");

    let dates = [
        "2026-03-10T00:00:00.000Z",
        "2026-03-20T00:00:00.000Z",
        "2026-03-15T00:00:00.000Z",
    ];
    for (i, date) in dates.iter().enumerate() {
        let id = format!("{}-ex{}", athlete_id, i);
        db.upsert_exercise(&test_exercise(&id, &athlete_id, date))
            .await
            .unwrap();
    }

    let exercises = db.exercises_for_athlete(&athlete_id).await.unwrap();
    assert_eq!(exercises.len(), 3);
    let fetched_dates: Vec<&str> = exercises
        .iter()
        .map(|e| e.completion_date.as_str())
        .collect();
    assert_eq!(
        fetched_dates,
        vec![
            "2026-03-20T00:00:00.000Z",
            "2026-03-15T00:00:00.000Z",
            "2026-03-10T00:00:00.000Z",
        ]
    );

    // Single lookup by ID
    let one = db
        .get_exercise(&format!("{}-ex0", athlete_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(one.athlete_id, athlete_id);

    println!("✓ Exercise ordering verified: athlete_id={}", athlete_id);
}

#[tokio::test]
async fn test_symptom_log_crud() {
    require_emulator!();

    let db = test_db().await;
    let athlete_id = unique_uid("ath");

    let first = format!("{}-log1", athlete_id);
    let second = format!("{}-log2", athlete_id);
    db.upsert_symptom_log(&test_log(&first, &athlete_id, "2026-02-01T08:00:00.000Z"))
        .await
        .unwrap();
    db.upsert_symptom_log(&test_log(&second, &athlete_id, "2026-02-02T08:00:00.000Z"))
        .await
        .unwrap();

    let logs = db.symptom_logs_for_athlete(&athlete_id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].log_id, second, "Newest entry should lead");

    db.delete_symptom_log(&first).await.unwrap();
    let logs = db.symptom_logs_for_athlete(&athlete_id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].log_id, second);

    let gone = db.get_symptom_log(&first).await.unwrap();
    assert!(gone.is_none(), "Deleted log should not be fetchable");

    println!("✓ Symptom log CRUD verified: athlete_id={}", athlete_id);
}

#[tokio::test]
async fn test_chat_rooms_are_isolated() {
    require_emulator!();

    let db = test_db().await;
    let ath = unique_uid("ath");
    let pt = unique_uid("pt");
    let other = unique_uid("other");

    let room = room_id_for(&ath, &pt);
    let other_room = room_id_for(&ath, &other);

    db.upsert_message(&test_message(
        &format!("{}-m1", room),
        &room,
        &ath,
        "2026-02-01T08:00:00.000Z",
    ))
    .await
    .unwrap();
    db.upsert_message(&test_message(
        &format!("{}-m2", room),
        &room,
        &pt,
        "2026-02-01T08:05:00.000Z",
    ))
    .await
    .unwrap();
    db.upsert_message(&test_message(
        &format!("{}-m3", other_room),
        &other_room,
        &ath,
        "2026-02-01T08:10:00.000Z",
    ))
    .await
    .unwrap();

    let messages = db.messages_for_room(&room).await.unwrap();
    assert_eq!(messages.len(), 2, "Only this room's messages");
    assert_eq!(messages[0].sender_id, pt, "Most recent first");
    assert_eq!(messages[1].sender_id, ath);

    println!("✓ Chat room isolation verified: room={}", room);
}
