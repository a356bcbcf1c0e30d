//! PostgreSQL repository against a throwaway container.
//!
//! Run with `cargo test -p domain_users -- --ignored` (needs Docker).

use domain_users::{NewUser, PgUserRepository, UserError, UserRepository};
use test_utils::TestDatabase;

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
    }
}

async fn repository() -> (TestDatabase, PgUserRepository) {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    repo.ensure_schema().await.unwrap();
    (db, repo)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_create_assigns_ids_and_enforces_unique_email() {
    let (_db, repo) = repository().await;

    let first = repo.create(new_user("alice", "alice@example.com")).await.unwrap();
    assert!(first.id > 0);

    let err = repo
        .create(new_user("alice2", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::DuplicateEmail(_)));

    let err = repo
        .create(new_user("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::DuplicateUsername(_)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_and_delete() {
    let (_db, repo) = repository().await;

    let mut user = repo.create(new_user("bob", "bob@example.com")).await.unwrap();
    user.email = "robert@example.com".to_string();
    let updated = repo.update(user.clone()).await.unwrap();
    assert_eq!(updated.email, "robert@example.com");

    assert!(repo.email_exists("robert@example.com").await.unwrap());
    assert_eq!(
        repo.get_by_email("robert@example.com").await.unwrap().map(|u| u.id),
        Some(user.id)
    );

    assert!(repo.delete(user.id).await.unwrap());
    assert!(!repo.delete(user.id).await.unwrap());
    assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    assert!(repo.list().await.unwrap().is_empty());
}
