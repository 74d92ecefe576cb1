//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use pollsite::orm::{authors, choices, questions};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid fixture date")
}

pub fn days_from_now(days: i64) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::days(days)
}

pub async fn create_author(db: &DatabaseConnection, name: &str) -> Result<authors::Model, DbErr> {
    let now = Utc::now().naive_utc();
    authors::ActiveModel {
        name: Set(name.to_string()),
        created_date: Set(now),
        updated_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_question(
    db: &DatabaseConnection,
    author_id: i32,
    text: &str,
    pub_date: NaiveDateTime,
) -> Result<questions::Model, DbErr> {
    let now = Utc::now().naive_utc();
    questions::ActiveModel {
        question_text: Set(text.to_string()),
        pub_date: Set(pub_date),
        ref_author_id: Set(author_id),
        created_date: Set(now),
        updated_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_choice(
    db: &DatabaseConnection,
    question_id: i32,
    text: &str,
    votes: i32,
) -> Result<choices::Model, DbErr> {
    let now = Utc::now().naive_utc();
    choices::ActiveModel {
        choice_text: Set(text.to_string()),
        votes: Set(votes),
        question_id: Set(question_id),
        created_date: Set(now),
        updated_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn get_question(db: &DatabaseConnection, id: i32) -> Result<questions::Model, DbErr> {
    questions::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("question {}", id)))
}
