//! PostgreSQL repositories against a live database
//!
//! Run with `--features integration` and `TEST_DATABASE_URL` set.

mod common;

use chrono::{Duration, Utc};
use common::{kg, target_in, TestApp};
use peso_backend::repositories::{
    GoalRepository, SessionRepository, UserRepository, WeightRepository,
};
use peso_shared::{
    calendar, Credential, Goal, GoalId, Session, SessionId, User, UserId, Weight, WeightId,
    WeightUnit,
};
use uuid::Uuid;

async fn stored_user(app: &TestApp) -> User {
    let id = UserId::generate();
    let user = User::new(id.clone(), "Pg User", format!("{}@example.com", id)).unwrap();
    app.repositories.users.save(&user).await.unwrap();
    user
}

fn weight(user: &User, value: f64, days_ago: i64) -> Weight {
    Weight::new(
        WeightId::new(&format!("w_{}", Uuid::new_v4())).unwrap(),
        user.id().clone(),
        kg(value),
        WeightUnit::Kg,
        Utc::now() - Duration::days(days_ago),
        "",
    )
    .unwrap()
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_user_round_trip_and_lookup() {
    let app = TestApp::new().await;
    let mut user = stored_user(&app).await;

    let loaded = app.repositories.users.find_by_id(user.id()).await.unwrap();
    assert_eq!(loaded.email(), user.email());
    assert!(!loaded.has_password());

    user.set_credential(Credential::from_hash("$argon2id$v=19$stub").unwrap());
    app.repositories.users.save(&user).await.unwrap();

    let by_email = app.repositories.users.find_by_email(user.email()).await.unwrap();
    assert!(by_email.has_password());
    assert!(app.repositories.users.email_exists(user.email()).await.unwrap());
    assert!(app.repositories.users.exists(user.id()).await.unwrap());

    let missing = app
        .repositories
        .users
        .find_by_id(&UserId::new("no-such-user").unwrap())
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_weight_queries() {
    let app = TestApp::new().await;
    let user = stored_user(&app).await;
    let weights = &app.repositories.weights;

    for (value, days_ago) in [(74.0, 40), (72.0, 10), (71.0, 1)] {
        weights.save(&weight(&user, value, days_ago)).await.unwrap();
    }

    let latest = weights.find_latest_by_user_id(user.id()).await.unwrap();
    assert_eq!(latest.value().as_f64(), 71.0);

    let recent = weights.find_by_user_id(user.id(), 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].value().as_f64(), 71.0);

    let now = Utc::now();
    let period = weights
        .find_by_user_id_and_period(user.id(), now - Duration::days(30), now)
        .await
        .unwrap();
    let values: Vec<f64> = period.iter().map(|w| w.value().as_f64()).collect();
    assert_eq!(values, vec![72.0, 71.0]);

    let day = calendar::start_of_day(latest.measured_at());
    assert_eq!(
        weights.count_by_user_id_and_date(user.id(), day).await.unwrap(),
        1
    );

    weights.delete(latest.id()).await.unwrap();
    assert!(weights.delete(latest.id()).await.unwrap_err().is_not_found());
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_goal_activation() {
    let app = TestApp::new().await;
    let user = stored_user(&app).await;
    let goals = &app.repositories.goals;

    let goal = Goal::new(
        GoalId::new(&format!("g_{}", Uuid::new_v4())).unwrap(),
        user.id().clone(),
        kg(65.0),
        WeightUnit::Kg,
        target_in(30),
        "pg",
    )
    .unwrap();
    goals.save(&goal).await.unwrap();

    let active = goals.find_active_by_user_id(user.id()).await.unwrap();
    assert_eq!(active.id(), goal.id());
    assert_eq!(active.target_date(), goal.target_date());

    assert_eq!(goals.deactivate_by_user_id(user.id()).await.unwrap(), 1);
    assert!(goals
        .find_active_by_user_id(user.id())
        .await
        .unwrap_err()
        .is_not_found());
    assert_eq!(goals.find_by_user_id(user.id()).await.unwrap().len(), 1);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_session_expiry() {
    let app = TestApp::new().await;
    let user = stored_user(&app).await;
    let sessions = &app.repositories.sessions;

    let live = Session::new(user.id().clone());
    sessions.save(&live).await.unwrap();

    let long_ago = Utc::now() - Duration::days(40);
    let stale = Session::reconstruct(
        SessionId::generate(),
        user.id().clone(),
        format!("stale-{}", Uuid::new_v4()),
        long_ago + Duration::days(30),
        long_ago,
    );
    sessions.save(&stale).await.unwrap();

    assert!(sessions.delete_expired().await.unwrap() >= 1);
    assert!(sessions.find_by_token(stale.token()).await.unwrap_err().is_not_found());

    let found = sessions.find_by_token(live.token()).await.unwrap();
    assert_eq!(found.user_id(), user.id());

    sessions.delete_by_token(live.token()).await.unwrap();
    sessions.delete_by_token(live.token()).await.unwrap();
    assert_eq!(sessions.delete_by_user_id(user.id()).await.unwrap(), 0);
}
