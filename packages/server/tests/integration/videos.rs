use reqwest::Method;
use reqwest::multipart::Form;
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::common::{TestApp, image_part, routes, video_part};
use server::entity::video;

mod publish {
    use super::*;

    #[tokio::test]
    async fn publishing_creates_a_published_video() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let res = app.publish(&session.access_token, "Ownership", "Borrowing explained").await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["statusCode"], 201);
        let data = &res.body["data"];
        assert_eq!(data["title"], "Ownership");
        assert_eq!(data["description"], "Borrowing explained");
        assert_eq!(data["isPublished"], true);
        assert_eq!(data["views"], 0);
        assert_eq!(data["duration"], 0.0);
        assert_eq!(data["owner"], session.id.as_str());
        assert!(data["videoFile"]["url"].is_string());
        assert!(data["thumbnail"]["url"].is_string());
        assert_eq!(app.stored_files("videos").len(), 1);
    }

    #[tokio::test]
    async fn description_alone_is_enough() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let form = Form::new()
            .text("description", "Untitled but described")
            .part("videoFile", video_part())
            .part("thumbnail", image_part("thumb.png"));
        let res = app
            .multipart(Method::POST, routes::VIDEOS, form, Some(&session.access_token))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["title"], "");
    }

    #[tokio::test]
    async fn missing_thumbnail_creates_nothing_and_uploads_nothing() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let images_before = app.stored_files("images").len();

        let form = Form::new()
            .text("title", "No thumb")
            .part("videoFile", video_part());
        let res = app
            .multipart(Method::POST, routes::VIDEOS, form, Some(&session.access_token))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(video::Entity::find().count(&app.db).await.unwrap(), 0);
        assert!(app.stored_files("videos").is_empty());
        assert_eq!(app.stored_files("images").len(), images_before);
    }

    #[tokio::test]
    async fn title_or_description_is_required() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let res = app.publish(&session.access_token, "  ", "").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Title or description is required");
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .text("title", "Anon")
            .part("videoFile", video_part())
            .part("thumbnail", image_part("thumb.png"));
        let res = app.multipart(Method::POST, routes::VIDEOS, form, None).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_MISSING");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn only_published_videos_newest_first() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let oldest = app.create_video(&session.access_token, "Oldest").await;
        let hidden = app.create_video(&session.access_token, "Hidden").await;
        let newest = app.create_video(&session.access_token, "Newest").await;

        let toggled = app
            .patch_empty(&routes::toggle_publish(&hidden), Some(&session.access_token))
            .await;
        assert_eq!(toggled.status, 200, "{}", toggled.text);

        let res = app.get(routes::VIDEOS, None).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let docs = res.body["data"]["docs"].as_array().unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec![newest.as_str(), oldest.as_str()]);
        assert_eq!(docs[0]["owner"]["username"], "alice");
        assert!(docs[0]["owner"]["avatar"].is_string());
        assert_eq!(res.body["data"]["totalDocs"], 2);
    }

    #[tokio::test]
    async fn pagination_metadata() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        for i in 0..5 {
            app.create_video(&session.access_token, &format!("Video {i}")).await;
        }

        let res = app.get(&format!("{}?page=2&limit=2", routes::VIDEOS), None).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let page = &res.body["data"];
        assert_eq!(page["docs"].as_array().unwrap().len(), 2);
        assert_eq!(page["totalDocs"], 5);
        assert_eq!(page["limit"], 2);
        assert_eq!(page["page"], 2);
        assert_eq!(page["totalPages"], 3);
        assert_eq!(page["pagingCounter"], 3);
        assert_eq!(page["hasPrevPage"], true);
        assert_eq!(page["hasNextPage"], true);
        assert_eq!(page["prevPage"], 1);
        assert_eq!(page["nextPage"], 3);
    }

    #[tokio::test]
    async fn oversized_limit_is_clamped() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{}?limit=5000", routes::VIDEOS), None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["limit"], 100);
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        app.create_video(&session.access_token, "Only one").await;

        let res = app
            .get(&format!("{}?page={}", routes::VIDEOS, i64::MAX), None)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let page = &res.body["data"];
        assert!(page["docs"].as_array().unwrap().is_empty());
        assert_eq!(page["totalDocs"], 1);
        assert_eq!(page["hasNextPage"], false);
        assert_eq!(page["hasPrevPage"], true);
    }

    #[tokio::test]
    async fn search_matches_title_or_description_case_insensitively() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        app.publish(&session.access_token, "Rust Ownership", "intro").await;
        app.publish(&session.access_token, "Cooking", "a RUSTic bread recipe").await;
        app.publish(&session.access_token, "Gardening", "tomatoes").await;

        let res = app.get(&format!("{}?query=rust", routes::VIDEOS), None).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["totalDocs"], 2);
    }

    #[tokio::test]
    async fn search_wildcards_are_literal() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        app.publish(&session.access_token, "Plain title", "nothing special").await;
        app.publish(&session.access_token, "100% coverage", "tests").await;

        let res = app.get(&format!("{}?query=%25", routes::VIDEOS), None).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let docs = res.body["data"]["docs"].as_array().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["title"], "100% coverage");
    }

    #[tokio::test]
    async fn filters_by_owner() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        app.create_video(&alice.access_token, "Alice 1").await;
        app.create_video(&bob.access_token, "Bob 1").await;
        app.create_video(&bob.access_token, "Bob 2").await;

        let res = app
            .get(&format!("{}?userId={}", routes::VIDEOS, bob.id), None)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let docs = res.body["data"]["docs"].as_array().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d["owner"]["username"] == "bob"));
    }

    #[tokio::test]
    async fn malformed_user_id_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{}?userId=not-a-uuid", routes::VIDEOS), None).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn sorts_when_both_sort_keys_are_given() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let b = app.create_video(&session.access_token, "Bravo").await;
        let a = app.create_video(&session.access_token, "Alpha").await;
        let c = app.create_video(&session.access_token, "Charlie").await;

        let res = app
            .get(&format!("{}?sortBy=title&sortType=asc", routes::VIDEOS), None)
            .await;
        let ids: Vec<String> = res.body["data"]["docs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec![a.clone(), b.clone(), c.clone()]);

        let res = app.get(&format!("{}?sortBy=title", routes::VIDEOS), None).await;
        let first = res.body["data"]["docs"][0]["id"].as_str().unwrap();
        assert_eq!(first, c, "sortBy alone keeps the newest-first default");
    }

    #[tokio::test]
    async fn unknown_sort_field_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&format!("{}?sortBy=password&sortType=asc", routes::VIDEOS), None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod watching {
    use super::*;

    #[tokio::test]
    async fn each_view_is_counted() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let id = app.create_video(&session.access_token, "Counted").await;

        let first = app.get(&routes::video(&id), Some(&session.access_token)).await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body["data"]["views"], 1);
        assert_eq!(first.body["data"]["owner"]["username"], "alice");

        let second = app.get(&routes::video(&id), Some(&session.access_token)).await;
        assert_eq!(second.body["data"]["views"], 2);
    }

    #[tokio::test]
    async fn unpublished_video_is_visible_to_owner_only() {
        let app = TestApp::spawn().await;
        let owner = app.create_user("alice").await;
        let stranger = app.create_user("bob").await;
        let id = app.create_video(&owner.access_token, "Draft").await;
        app.patch_empty(&routes::toggle_publish(&id), Some(&owner.access_token))
            .await;

        let as_owner = app.get(&routes::video(&id), Some(&owner.access_token)).await;
        assert_eq!(as_owner.status, 200);

        let as_stranger = app.get(&routes::video(&id), Some(&stranger.access_token)).await;
        assert_eq!(as_stranger.status, 404);
        assert_eq!(as_stranger.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;

        let bad = app.get(&routes::video("xyz"), Some(&session.access_token)).await;
        assert_eq!(bad.status, 400);

        let missing = app
            .get(
                &routes::video(&uuid::Uuid::now_v7().to_string()),
                Some(&session.access_token),
            )
            .await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let id = app.create_video(&session.access_token, "Private view").await;

        let res = app.get(&routes::video(&id), None).await;

        assert_eq!(res.status, 401);
    }
}

mod editing {
    use super::*;

    #[tokio::test]
    async fn owner_can_update_title_and_thumbnail() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let id = app.create_video(&session.access_token, "Before").await;
        let old = video::Entity::find_by_id(uuid::Uuid::parse_str(&id).unwrap())
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();

        let form = Form::new()
            .text("title", "After")
            .part("thumbnail", image_part("new-thumb.png"));
        let res = app
            .multipart(Method::PATCH, &routes::video(&id), form, Some(&session.access_token))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["title"], "After");
        assert_eq!(res.body["data"]["description"], "A test video");
        assert_ne!(
            res.body["data"]["thumbnail"]["storageId"],
            old.thumbnail_storage_id.as_str()
        );
        assert!(!app.media_root().join(&old.thumbnail_storage_id).exists());
    }

    #[tokio::test]
    async fn put_updates_like_patch() {
        let app = TestApp::spawn().await;
        let owner = app.create_user("alice").await;
        let intruder = app.create_user("mallory").await;
        let id = app.create_video(&owner.access_token, "Before").await;

        let form = Form::new().text("description", "Rewritten");
        let res = app
            .multipart(Method::PUT, &routes::video(&id), form, Some(&owner.access_token))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["title"], "Before");
        assert_eq!(res.body["data"]["description"], "Rewritten");

        let form = Form::new().text("title", "Stolen");
        let res = app
            .multipart(Method::PUT, &routes::video(&id), form, Some(&intruder.access_token))
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn other_users_cannot_update() {
        let app = TestApp::spawn().await;
        let owner = app.create_user("alice").await;
        let intruder = app.create_user("mallory").await;
        let id = app.create_video(&owner.access_token, "Mine").await;

        let form = Form::new().text("title", "Stolen");
        let res = app
            .multipart(Method::PATCH, &routes::video(&id), form, Some(&intruder.access_token))
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");

        let toggle = app
            .patch_empty(&routes::toggle_publish(&id), Some(&intruder.access_token))
            .await;
        assert_eq!(toggle.status, 403);
    }

    #[tokio::test]
    async fn toggle_flips_publish_status() {
        let app = TestApp::spawn().await;
        let session = app.create_user("alice").await;
        let id = app.create_video(&session.access_token, "Flip").await;

        let off = app
            .patch_empty(&routes::toggle_publish(&id), Some(&session.access_token))
            .await;
        assert_eq!(off.body["data"]["isPublished"], false);

        let on = app
            .patch_empty(&routes::toggle_publish(&id), Some(&session.access_token))
            .await;
        assert_eq!(on.body["data"]["isPublished"], true);
    }
}
