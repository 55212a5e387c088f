use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

use crate::common::{ADMIN_PASSWORD, ADMIN_USERNAME, JWT_SECRET, TestApp, routes};
use worship_server::entity::role::Role;
use worship_server::entity::user;
use worship_server::utils::jwt;

mod login {
    use super::*;

    #[tokio::test]
    async fn bootstrap_admin_can_log_in() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(res.body["username"], ADMIN_USERNAME);
        assert_eq!(res.body["role"], "admin");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": ADMIN_USERNAME, "password": "wrong"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
        assert_eq!(res.body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn unknown_user_gets_the_same_answer_as_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "nobody", "password": "whatever"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn empty_fields_are_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"username": " ", "password": "x"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"username": "admin"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    async fn insert_user_with_hash(app: &TestApp, username: &str, stored: String) -> i32 {
        user::ActiveModel {
            username: Set(username.into()),
            password: Set(stored),
            role: Set(Role::Member),
            ..Default::default()
        }
        .insert(&app.db)
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn legacy_bcrypt_hash_is_accepted_and_upgraded() {
        let app = TestApp::spawn().await;
        let legacy = bcrypt::hash("legacy-pass", 4).unwrap();
        let id = insert_user_with_hash(&app, "veteran", legacy).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "veteran", "password": "legacy-pass"}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["role"], "member");

        let stored = user::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.password.starts_with("$argon2"), "{}", stored.password);

        app.login("veteran", "legacy-pass").await;
        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "veteran", "password": "Legacy-pass"}),
            )
            .await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn unreadable_stored_hash_is_invalid_credentials() {
        let app = TestApp::spawn().await;
        insert_user_with_hash(&app, "broken", "plaintext-from-an-import".into()).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "broken", "password": "plaintext-from-an-import"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::SONGS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        assert_eq!(res.body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn garbage_token_is_forbidden() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::SONGS, "not-a-jwt").await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_forbidden() {
        let app = TestApp::spawn().await;
        let token = jwt::sign(1, ADMIN_USERNAME, Role::Admin, "some-other-secret", 3600).unwrap();

        let res = app.get_with_token(routes::SONGS, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn expired_token_is_forbidden() {
        let app = TestApp::spawn().await;
        let token = jwt::sign(1, ADMIN_USERNAME, Role::Admin, JWT_SECRET, -3600).unwrap();

        let res = app.get_with_token(routes::SONGS, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod profile {
    use super::*;

    #[tokio::test]
    async fn returns_the_callers_account() {
        let app = TestApp::spawn().await;
        let (id, token) = app.create_user_with_role("keys_player", "member").await;

        let res = app.get_with_token(routes::PROFILE, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["username"], "keys_player");
        assert_eq!(res.body["role"], "member");
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn deleted_account_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (id, token) = app.create_user_with_role("former_member", "member").await;

        let del = app.delete_with_token(&routes::user(id), &admin).await;
        assert_eq!(del.status, 200, "{}", del.text);

        let res = app.get_with_token(routes::PROFILE, &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
