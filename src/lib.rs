pub mod admin;
pub mod app_config;
pub mod db;
pub mod messages;
pub mod middleware;
pub mod migration;
pub mod orm;
pub mod sample_app;
pub mod template;
pub mod web;
