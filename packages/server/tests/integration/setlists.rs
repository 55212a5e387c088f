use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn song_ids(detail: &Value) -> Vec<i64> {
    detail["songs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

mod create {
    use super::*;

    #[tokio::test]
    async fn dashboard_payload_with_blank_date_and_duplicates() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_song("Amazing Grace", &token).await;
        let b = app.create_song("Doxology", &token).await;

        let res = app
            .post_with_token(
                routes::SETLISTS,
                &json!({"name": "Easter Sunday", "date": "", "songIds": [b, a, b]}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let id = res.id();

        let detail = app.get_with_token(&routes::setlist(id), &token).await;
        assert_eq!(detail.status, 200);
        assert_eq!(detail.body["name"], "Easter Sunday");
        assert!(detail.body["date"].is_null());
        assert_eq!(song_ids(&detail.body), vec![a, b]);
    }

    #[tokio::test]
    async fn unknown_song_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_song("Amazing Grace", &token).await;

        let res = app
            .post_with_token(
                routes::SETLISTS,
                &json!({"name": "Sunday", "songIds": [a, 999]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let list = app.get_with_token(routes::SETLISTS, &token).await;
        assert!(list.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_date_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::SETLISTS,
                &json!({"name": "Sunday", "date": "next sunday"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn member_cannot_create() {
        let app = TestApp::spawn().await;
        let (_, member) = app.create_user_with_role("member1", "member").await;

        let res = app
            .post_with_token(routes::SETLISTS, &json!({"name": "Sunday"}), &member)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn newest_date_first_with_creator_names() {
        let app = TestApp::spawn().await;
        let (leader_id, leader) = app.create_user_with_role("worship_leader", "leader").await;
        let early = app
            .create_setlist(&json!({"name": "Palm Sunday", "date": "2025-04-13"}), &leader)
            .await;
        let late = app
            .create_setlist(&json!({"name": "Easter", "date": "2025-04-20"}), &leader)
            .await;
        let (_, member) = app.create_user_with_role("member1", "member").await;

        let res = app.get_with_token(routes::SETLISTS, &member).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], late);
        assert_eq!(items[0]["date"], "2025-04-20");
        assert_eq!(items[1]["id"], early);
        assert_eq!(items[0]["created_by"], leader_id);
        assert_eq!(items[0]["created_by_username"], "worship_leader");
    }

    #[tokio::test]
    async fn undated_setlists_come_last() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let undated = app.create_setlist(&json!({"name": "Someday"}), &token).await;
        let dated = app
            .create_setlist(&json!({"name": "Pentecost", "date": "2025-06-08"}), &token)
            .await;

        let res = app.get_with_token(routes::SETLISTS, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], dated);
        assert_eq!(items[1]["id"], undated);
        assert!(items[1]["date"].is_null());
    }

    #[tokio::test]
    async fn renaming_the_creator_refreshes_the_list() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (leader_id, leader) = app.create_user_with_role("old_name", "leader").await;
        app.create_setlist(&json!({"name": "Sunday"}), &leader).await;

        let before = app.get_with_token(routes::SETLISTS, &admin).await;
        assert_eq!(before.body[0]["created_by_username"], "old_name");

        let res = app
            .put_with_token(
                &routes::user(leader_id),
                &json!({"username": "new_name", "role": "leader"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let after = app.get_with_token(routes::SETLISTS, &admin).await;
        assert_eq!(after.body[0]["created_by_username"], "new_name");
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn missing_setlist_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token(&routes::setlist(7), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn member_cannot_edit() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app.create_setlist(&json!({"name": "Sunday"}), &admin).await;
        let (_, member) = app.create_user_with_role("member1", "member").await;

        let res = app
            .put_with_token(&routes::setlist(id), &json!({"name": "Hijacked"}), &member)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let detail = app.get_with_token(&routes::setlist(id), &admin).await;
        assert_eq!(detail.body["name"], "Sunday");
    }

    #[tokio::test]
    async fn song_ids_replace_the_songs() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_song("A", &token).await;
        let b = app.create_song("B", &token).await;
        let c = app.create_song("C", &token).await;
        let id = app
            .create_setlist(&json!({"name": "Sunday", "songIds": [a, b]}), &token)
            .await;

        let res = app
            .put_with_token(
                &routes::setlist(id),
                &json!({"name": "Sunday AM", "date": "2025-06-01", "songIds": [c, b]}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get_with_token(&routes::setlist(id), &token).await;
        assert_eq!(detail.body["name"], "Sunday AM");
        assert_eq!(detail.body["date"], "2025-06-01");
        assert_eq!(song_ids(&detail.body), vec![b, c]);
    }

    #[tokio::test]
    async fn absent_song_ids_keep_the_songs() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_song("A", &token).await;
        let id = app
            .create_setlist(&json!({"name": "Sunday", "songIds": [a]}), &token)
            .await;

        let res = app
            .put_with_token(&routes::setlist(id), &json!({"name": "Renamed"}), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get_with_token(&routes::setlist(id), &token).await;
        assert_eq!(song_ids(&detail.body), vec![a]);
    }

    #[tokio::test]
    async fn empty_song_ids_clear_the_songs() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_song("A", &token).await;
        let id = app
            .create_setlist(&json!({"name": "Sunday", "songIds": [a]}), &token)
            .await;

        let res = app
            .put_with_token(
                &routes::setlist(id),
                &json!({"name": "Sunday", "songIds": []}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get_with_token(&routes::setlist(id), &token).await;
        assert!(song_ids(&detail.body).is_empty());
    }

    #[tokio::test]
    async fn unknown_song_leaves_the_setlist_untouched() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_song("A", &token).await;
        let id = app
            .create_setlist(&json!({"name": "Sunday", "songIds": [a]}), &token)
            .await;

        let res = app
            .put_with_token(
                &routes::setlist(id),
                &json!({"name": "Changed", "songIds": [404]}),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);

        let detail = app.get_with_token(&routes::setlist(id), &token).await;
        assert_eq!(detail.body["name"], "Sunday");
        assert_eq!(song_ids(&detail.body), vec![a]);
    }

    #[tokio::test]
    async fn missing_setlist_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .put_with_token(&routes::setlist(5), &json!({"name": "Ghost"}), &token)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn member_cannot_delete() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app.create_setlist(&json!({"name": "Sunday"}), &admin).await;
        let (_, member) = app.create_user_with_role("member1", "member").await;

        let res = app.delete_with_token(&routes::setlist(id), &member).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let detail = app.get_with_token(&routes::setlist(id), &admin).await;
        assert_eq!(detail.status, 200);
    }

    #[tokio::test]
    async fn removes_setlist_but_keeps_songs() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_song("A", &token).await;
        let id = app
            .create_setlist(&json!({"name": "Sunday", "songIds": [a]}), &token)
            .await;

        let res = app.delete_with_token(&routes::setlist(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let detail = app.get_with_token(&routes::setlist(id), &token).await;
        assert_eq!(detail.status, 404);

        let list = app.get_with_token(routes::SETLISTS, &token).await;
        assert!(list.body.as_array().unwrap().is_empty());

        let songs = app.get_with_token(routes::SONGS, &token).await;
        assert_eq!(songs.body.as_array().unwrap().len(), 1);
    }
}
