//! Add and change forms

mod common;

use actix_web::{http::StatusCode, test};
use pollsite::orm::{authors, questions};
use sea_orm::EntityTrait;

#[actix_rt::test]
async fn test_unknown_model_and_record_are_not_found() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let app = admin_app!(db);

    for uri in [
        "/admin/auth/user/",
        "/admin/sample_app/poll/",
        "/admin/sample_app/question/999/change/",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_rt::test]
async fn test_add_author() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let app = admin_app!(db.clone());

    let req = test::TestRequest::get()
        .uri("/admin/sample_app/author/add/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = common::session_cookie(&resp).expect("session cookie");
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Author information"));
    assert!(!body.contains("inline-group"));
    let token = common::extract_csrf_token(&body).expect("csrf token");

    // A blank name is rejected and the form is shown again.
    let req = test::TestRequest::post()
        .uri("/admin/sample_app/author/add/")
        .cookie(cookie.clone())
        .set_form(&[("csrf_token", token.as_str()), ("name", "  ")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Please correct the errors below."));
    assert!(body.contains("This field is required."));
    assert!(authors::Entity::find().all(&db).await.unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri("/admin/sample_app/author/add/")
        .cookie(cookie.clone())
        .set_form(&[
            ("csrf_token", token.as_str()),
            ("name", "jane"),
            ("_continue", "Save and continue editing"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let saved = authors::Entity::find().all(&db).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "jane");
    assert_eq!(
        common::location(&resp),
        format!("/admin/sample_app/author/{}/change/", saved[0].id)
    );
}

#[actix_rt::test]
async fn test_change_question() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let author = common::fixtures::create_author(&db, "jane").await.unwrap();
    let q = common::fixtures::create_question(
        &db,
        author.id,
        "Old wording?",
        common::fixtures::at(2024, 1, 1, 12, 0),
    )
    .await
    .unwrap();

    let app = admin_app!(db.clone());

    // The author page lists the question inline.
    let req = test::TestRequest::get()
        .uri(&format!("/admin/sample_app/author/{}/change/", author.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Old wording?"));
    let uri = format!("/admin/sample_app/question/{}/change/", q.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = common::session_cookie(&resp).expect("session cookie");
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Old wording?"));
    assert!(body.contains("Question information"));
    let token = common::extract_csrf_token(&body).expect("csrf token");

    let author_id = author.id.to_string();

    // Unknown author is a field error, not a database failure.
    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(cookie.clone())
        .set_form(&[
            ("csrf_token", token.as_str()),
            ("question_text", "New wording?"),
            ("pub_date", "2024-06-01T08:30"),
            ("ref_author", "4242"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Select a valid choice."));

    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(cookie)
        .set_form(&[
            ("csrf_token", token.as_str()),
            ("question_text", "New wording?"),
            ("pub_date", "2024-06-01T08:30"),
            ("ref_author", author_id.as_str()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/admin/sample_app/question/");

    let saved = questions::Entity::find_by_id(q.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.question_text, "New wording?");
    assert_eq!(saved.pub_date, common::fixtures::at(2024, 6, 1, 8, 30));
    assert_eq!(saved.created_date, q.created_date);
}

#[actix_rt::test]
async fn test_author_outside_scope_is_not_found() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let hidden = common::fixtures::create_author(&db, "bob").await.unwrap();
    let app = admin_app!(db);

    let req = test::TestRequest::get()
        .uri(&format!("/admin/sample_app/author/{}/change/", hidden.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
