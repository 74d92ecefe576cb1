//! Bulk "mark as published" action

mod common;

use actix_web::{http::StatusCode, test};
use chrono::{Duration, Utc};
use pollsite::admin::actions::make_published;

#[actix_rt::test]
async fn test_make_published_only_touches_selection() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let author = common::fixtures::create_author(&db, "jane").await.unwrap();
    let original = common::fixtures::at(2030, 5, 1, 12, 0);
    let a = common::fixtures::create_question(&db, author.id, "A?", original)
        .await
        .unwrap();
    let b = common::fixtures::create_question(&db, author.id, "B?", original)
        .await
        .unwrap();
    let c = common::fixtures::create_question(&db, author.id, "C?", original)
        .await
        .unwrap();

    let now = common::fixtures::at(2024, 3, 10, 8, 30);
    let updated = make_published(&db, &[a.id, c.id], now).await.unwrap();
    assert_eq!(updated, 2);

    let expected = now - Duration::days(1);
    for id in [a.id, c.id] {
        let q = common::fixtures::get_question(&db, id).await.unwrap();
        assert_eq!(q.pub_date, expected);
    }
    let untouched = common::fixtures::get_question(&db, b.id).await.unwrap();
    assert_eq!(untouched.pub_date, original);

    // Applying twice leaves the same state.
    make_published(&db, &[a.id, c.id], now).await.unwrap();
    let q = common::fixtures::get_question(&db, a.id).await.unwrap();
    assert_eq!(q.pub_date, expected);

    assert_eq!(make_published(&db, &[], now).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_make_published_over_http() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let author = common::fixtures::create_author(&db, "jane").await.unwrap();
    let future = common::fixtures::days_from_now(30);
    let q = common::fixtures::create_question(&db, author.id, "Soon?", future)
        .await
        .unwrap();
    let other = common::fixtures::create_question(&db, author.id, "Later?", future)
        .await
        .unwrap();

    let app = admin_app!(db.clone());

    let req = test::TestRequest::get()
        .uri("/admin/sample_app/question/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = common::session_cookie(&resp).expect("session cookie");
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    let token = common::extract_csrf_token(&body).expect("csrf token");

    let before = Utc::now().naive_utc();
    let id = q.id.to_string();
    let req = test::TestRequest::post()
        .uri("/admin/sample_app/question/")
        .cookie(cookie.clone())
        .set_form(&[
            ("csrf_token", token.as_str()),
            ("action", "make_published"),
            ("_selected_action", id.as_str()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/admin/sample_app/question/");

    let published = common::fixtures::get_question(&db, q.id).await.unwrap();
    let after = Utc::now().naive_utc();
    // Stored timestamps may lose sub-second precision.
    assert!(published.pub_date >= before - Duration::days(1) - Duration::seconds(1));
    assert!(published.pub_date <= after - Duration::days(1));
    let unchanged = common::fixtures::get_question(&db, other.id).await.unwrap();
    assert_eq!(unchanged.pub_date, other.pub_date);
}

#[actix_rt::test]
async fn test_action_without_selection_changes_nothing() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let author = common::fixtures::create_author(&db, "jane").await.unwrap();
    let future = common::fixtures::days_from_now(30);
    let q = common::fixtures::create_question(&db, author.id, "Soon?", future)
        .await
        .unwrap();

    let app = admin_app!(db.clone());

    let req = test::TestRequest::get()
        .uri("/admin/sample_app/question/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = common::session_cookie(&resp).expect("session cookie");
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    let token = common::extract_csrf_token(&body).expect("csrf token");

    let req = test::TestRequest::post()
        .uri("/admin/sample_app/question/")
        .cookie(cookie)
        .set_form(&[("csrf_token", token.as_str()), ("action", "make_published")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let cookie = common::session_cookie(&resp).expect("updated session cookie");

    let unchanged = common::fixtures::get_question(&db, q.id).await.unwrap();
    assert_eq!(unchanged.pub_date, q.pub_date);

    let req = test::TestRequest::get()
        .uri("/admin/sample_app/question/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Items must be selected in order to perform actions on them."));
}

#[actix_rt::test]
async fn test_post_without_csrf_token_is_forbidden() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let app = admin_app!(db);

    let req = test::TestRequest::post()
        .uri("/admin/sample_app/question/")
        .set_form(&[("csrf_token", "nope"), ("action", "make_published")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
