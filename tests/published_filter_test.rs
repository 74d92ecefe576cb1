//! Published/Unpublished filter against a real database

mod common;

use actix_web::test;
use chrono::Utc;
use pollsite::admin::filters::{filter_questions, PublishedState};
use pollsite::orm::questions;
use sea_orm::{EntityTrait, QueryFilter};

#[actix_rt::test]
async fn test_published_condition_splits_on_now() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let author = common::fixtures::create_author(&db, "jane").await.unwrap();
    let past = common::fixtures::create_question(
        &db,
        author.id,
        "Past?",
        common::fixtures::days_from_now(-3),
    )
    .await
    .unwrap();
    let future = common::fixtures::create_question(
        &db,
        author.id,
        "Future?",
        common::fixtures::days_from_now(3),
    )
    .await
    .unwrap();

    let now = Utc::now().naive_utc();
    let published = questions::Entity::find()
        .filter(PublishedState::Published.condition(now))
        .all(&db)
        .await
        .unwrap();
    let unpublished = questions::Entity::find()
        .filter(PublishedState::Unpublished.condition(now))
        .all(&db)
        .await
        .unwrap();

    assert_eq!(published.iter().map(|q| q.id).collect::<Vec<_>>(), vec![past.id]);
    assert_eq!(
        unpublished.iter().map(|q| q.id).collect::<Vec<_>>(),
        vec![future.id]
    );

    // The in-memory predicate agrees with the SQL one.
    let all = questions::Entity::find().all(&db).await.unwrap();
    let kept = filter_questions(all.clone(), Some("Published"), now);
    assert_eq!(kept, published);
    assert_eq!(filter_questions(all.clone(), None, now).len(), 2);
    assert_eq!(filter_questions(all, Some("bogus"), now).len(), 2);
}

#[actix_rt::test]
async fn test_changelist_applies_published_filter() {
    let db = common::database::setup_test_database()
        .await
        .expect("Failed to setup test database");
    let author = common::fixtures::create_author(&db, "jane").await.unwrap();
    common::fixtures::create_question(
        &db,
        author.id,
        "Already out?",
        common::fixtures::days_from_now(-1),
    )
    .await
    .unwrap();
    common::fixtures::create_question(
        &db,
        author.id,
        "Coming soon?",
        common::fixtures::days_from_now(10),
    )
    .await
    .unwrap();

    let app = admin_app!(db);

    let req = test::TestRequest::get()
        .uri("/admin/sample_app/question/?pub_date=Published")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Already out?"));
    assert!(!body.contains("Coming soon?"));
    assert!(body.contains("By Published questions"));
    assert!(body.contains("Unpublished questions"));

    let req = test::TestRequest::get()
        .uri("/admin/sample_app/question/?pub_date=Unpublished")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!body.contains("Already out?"));
    assert!(body.contains("Coming soon?"));
}
