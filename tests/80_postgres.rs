//! Runs the ownership, task-attachment and cascade checks against a real
//! PostgreSQL database. Set `TEST_DATABASE_URL` to enable; without it every
//! test returns early.

mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use taskboard_api::config::AppConfig;
use taskboard_api::database::models::{NewProject, NewTask, NewUser, Priority, TaskChanges};
use taskboard_api::database::{DatabaseManager, PgStore, Store, StoreError};

use common::id_of;

async fn pg_store() -> Result<Option<PgStore>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping PostgreSQL tests");
        return Ok(None);
    };

    let config = AppConfig::development();
    let pool = DatabaseManager::connect(&url, &config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(PgStore::new(pool)))
}

/// Usernames are unique across runs sharing one database
fn unique(name: &str) -> String {
    format!("{}_{}", name, Uuid::new_v4().simple())
}

async fn user(store: &PgStore, name: &str) -> Result<i64> {
    let user = store
        .create_user(NewUser {
            username: unique(name),
            email: String::new(),
            password_hash: "x".to_string(),
        })
        .await?;
    Ok(user.id)
}

fn new_task(project_id: i64, title: &str) -> NewTask {
    NewTask {
        project_id,
        title: title.to_string(),
        priority: Priority::High,
        is_done: false,
    }
}

#[tokio::test]
async fn pg_duplicate_username_is_reported() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };

    let username = unique("alice");
    let new_user = || NewUser {
        username: username.clone(),
        email: String::new(),
        password_hash: "x".to_string(),
    };
    store.create_user(new_user()).await?;
    let err = store.create_user(new_user()).await.unwrap_err();
    assert!(matches!(err, StoreError::UsernameTaken(name) if name == username));
    Ok(())
}

#[tokio::test]
async fn pg_rows_are_scoped_to_owner() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let alice = user(&store, "alice").await?;
    let bob = user(&store, "bob").await?;

    let trip = store
        .create_project(
            alice,
            NewProject {
                title: "Trip".to_string(),
                description: String::new(),
            },
        )
        .await?;

    assert!(store.find_project(bob, trip.id).await?.is_none());
    assert!(store.list_projects(bob).await?.is_empty());
    assert!(!store.delete_project(bob, trip.id).await?);

    // The ownership check is part of the insert itself
    assert!(store.create_task(bob, new_task(trip.id, "Sneak")).await?.is_none());
    let task = store
        .create_task(alice, new_task(trip.id, "Book flight"))
        .await?
        .expect("owner can add tasks");
    assert_eq!(task.priority, Priority::High);

    let done = TaskChanges {
        is_done: Some(true),
        ..Default::default()
    };
    assert!(store.update_task(bob, task.id, done.clone()).await?.is_none());
    assert!(!store.delete_task(bob, task.id).await?);
    assert!(store.find_task(bob, task.id).await?.is_none());

    let updated = store.update_task(alice, task.id, done).await?.expect("owner can update");
    assert!(updated.is_done);
    assert_eq!(updated.priority, Priority::High);
    Ok(())
}

#[tokio::test]
async fn pg_project_delete_cascades() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let alice = user(&store, "alice").await?;

    let mut ids = Vec::new();
    for title in ["Trip", "Chores"] {
        let project = store
            .create_project(
                alice,
                NewProject {
                    title: title.to_string(),
                    description: String::new(),
                },
            )
            .await?;
        ids.push(project.id);
    }
    let (trip, chores) = (ids[0], ids[1]);

    store.create_task(alice, new_task(trip, "Book flight")).await?;
    store.create_task(alice, new_task(trip, "Pack")).await?;
    let dishes = store
        .create_task(alice, new_task(chores, "Dishes"))
        .await?
        .expect("owner can add tasks");

    assert!(store.delete_project(alice, trip).await?);
    assert!(store.tasks_for_projects(alice, &[trip]).await?.is_empty());

    let remaining: Vec<i64> = store.list_tasks(alice).await?.iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![dishes.id]);
    Ok(())
}

#[tokio::test]
async fn pg_http_scenario() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let server = common::spawn_server_with_store(Arc::new(store)).await?;

    let (alice_name, bob_name) = (unique("alice"), unique("bob"));
    let alice = server.signup(&alice_name, "pw1").await?;
    let bob = server.signup(&bob_name, "pw2").await?;

    let project = server.create_project(&alice, "Trip").await?;
    assert_eq!(project["owner"], alice_name.as_str());
    let trip = id_of(&project);
    let flight = id_of(&server.create_task(&alice, trip, "Book flight").await?);

    let res = server
        .request(Method::PATCH, &format!("/api/tasks/{}/", flight), &alice)
        .json(&json!({ "is_done": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let project: Value = server
        .request(Method::GET, &format!("/api/projects/{}/", trip), &alice)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(project["is_completed"], true);

    let res = server
        .request(Method::GET, &format!("/api/projects/{}/", trip), &bob)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
