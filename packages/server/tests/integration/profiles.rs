use reqwest::Method;
use reqwest::multipart::Form;
use serde_json::json;

use crate::common::{TestApp, image_part, routes};

mod current_user {
    use super::*;

    #[tokio::test]
    async fn returns_the_logged_in_user() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let res = app.get(routes::CURRENT_USER, Some(&session.access_token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["id"], session.id.as_str());
        assert_eq!(res.body["data"]["fullName"], "alice Fullname");
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::CURRENT_USER, None).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_MISSING");
        assert_eq!(res.body["success"], false);
    }
}

mod account {
    use super::*;

    #[tokio::test]
    async fn full_name_and_email_can_be_updated() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let res = app
            .patch_json(
                routes::UPDATE_ACCOUNT,
                &json!({"fullName": "Alice Liddell", "email": "Liddell@Example.com"}),
                Some(&session.access_token),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["fullName"], "Alice Liddell");
        assert_eq!(res.body["data"]["email"], "liddell@example.com");
    }

    #[tokio::test]
    async fn both_fields_are_required() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let res = app
            .patch_json(
                routes::UPDATE_ACCOUNT,
                &json!({"fullName": "Alice"}),
                Some(&session.access_token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn email_of_another_user_conflicts() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        app.register("bob").await;

        let res = app
            .patch_json(
                routes::UPDATE_ACCOUNT,
                &json!({"fullName": "Alice", "email": "bob@example.com"}),
                Some(&session.access_token),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");
    }
}

mod images {
    use super::*;

    #[tokio::test]
    async fn new_avatar_replaces_and_deletes_the_old_one() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let before = app.find_user("alice").await;

        let form = Form::new().part("avatar", image_part("new.png"));
        let res = app
            .multipart(Method::PATCH, routes::AVATAR, form, Some(&session.access_token))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let after = app.find_user("alice").await;
        assert_ne!(after.avatar_storage_id, before.avatar_storage_id);
        assert_eq!(res.body["data"]["avatar"]["url"], after.avatar_url.as_str());
        assert!(!app.media_root().join(&before.avatar_storage_id).exists());
        assert!(app.media_root().join(&after.avatar_storage_id).exists());
    }

    #[tokio::test]
    async fn failed_delete_of_old_avatar_is_not_fatal() {
        use sea_orm::{ActiveModelTrait, Set};
        use server::entity::user;

        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        // The filesystem relay refuses ids that leave its root.
        let mut stale: user::ActiveModel = app.find_user("alice").await.into();
        stale.avatar_storage_id = Set("../escape".to_string());
        stale.update(&app.db).await.unwrap();

        let form = Form::new().part("avatar", image_part("new.png"));
        let res = app
            .multipart(Method::PATCH, routes::AVATAR, form, Some(&session.access_token))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let after = app.find_user("alice").await;
        assert_ne!(after.avatar_storage_id, "../escape");
        assert_eq!(res.body["data"]["avatar"]["url"], after.avatar_url.as_str());
        assert!(app.media_root().join(&after.avatar_storage_id).exists());
    }

    #[tokio::test]
    async fn avatar_file_is_required() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let form = Form::new().text("note", "no file here");
        let res = app
            .multipart(Method::PATCH, routes::AVATAR, form, Some(&session.access_token))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cover_image_can_be_added() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let form = Form::new().part("coverImage", image_part("cover.png"));
        let res = app
            .multipart(Method::PATCH, routes::COVER_IMAGE, form, Some(&session.access_token))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"]["coverImage"]["url"].is_string());
        assert!(app.find_user("alice").await.cover_image_storage_id.is_some());
    }
}

mod channel {
    use super::*;

    #[tokio::test]
    async fn counts_subscribers_and_subscriptions() {
        let app = TestApp::spawn().await;
        let channel = app.create_user("chan").await;
        let fans = [
            app.create_user("fan1").await,
            app.create_user("fan2").await,
            app.create_user("fan3").await,
        ];
        let other = app.create_user("other").await;

        for fan in &fans {
            app.subscribe(&fan.id, &channel.id).await;
        }
        app.subscribe(&channel.id, &other.id).await;

        let anonymous = app.get(&routes::channel("chan"), None).await;
        assert_eq!(anonymous.status, 200, "{}", anonymous.text);
        assert_eq!(anonymous.body["data"]["subscriberCount"], 3);
        assert_eq!(anonymous.body["data"]["subscribedChannelCount"], 1);
        assert_eq!(anonymous.body["data"]["isSubscribed"], false);
        assert_eq!(anonymous.body["data"]["username"], "chan");

        let fan_view = app
            .get(&routes::channel("chan"), Some(&fans[1].access_token))
            .await;
        assert_eq!(fan_view.body["data"]["isSubscribed"], true);

        let other_view = app
            .get(&routes::channel("chan"), Some(&other.access_token))
            .await;
        assert_eq!(other_view.body["data"]["isSubscribed"], false);
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let app = TestApp::spawn().await;
        app.create_user("chan").await;

        let res = app.get(&routes::channel("CHAN"), None).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(!res.text.contains("password"));
    }

    #[tokio::test]
    async fn bad_token_is_treated_as_anonymous() {
        let app = TestApp::spawn().await;
        app.create_user("chan").await;

        let res = app.get(&routes::channel("chan"), Some("garbage")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["isSubscribed"], false);
    }

    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::channel("nobody"), None).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn lists_watched_videos_once_in_first_watch_order() {
        let app = TestApp::spawn().await;
        let creator = app.create_user("creator").await;
        let viewer = app.create_user("viewer").await;
        let first = app.create_video(&creator.access_token, "First").await;
        let second = app.create_video(&creator.access_token, "Second").await;

        for id in [&second, &first, &second] {
            let res = app.get(&routes::video(id), Some(&viewer.access_token)).await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let res = app.get(routes::HISTORY, Some(&viewer.access_token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let entries = res.body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], second.as_str());
        assert_eq!(entries[1]["id"], first.as_str());
        assert_eq!(entries[0]["owner"]["username"], "creator");
        assert_eq!(entries[0]["owner"]["fullName"], "creator Fullname");
        assert!(entries[0]["owner"]["avatar"].is_string());
    }

    #[tokio::test]
    async fn empty_for_a_new_user() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let res = app.get(routes::HISTORY, Some(&session.access_token)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"], json!([]));
    }
}
