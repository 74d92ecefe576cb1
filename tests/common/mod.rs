#![allow(dead_code)]

pub mod database;
pub mod fixtures;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;

/// Builds the admin app around `$db` with a cookie session and the sample site.
#[macro_export]
macro_rules! admin_app {
    ($db:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($db))
                .app_data(actix_web::web::Data::new(
                    pollsite::sample_app::admin_site(
                        &pollsite::app_config::SiteConfig::default(),
                    )
                    .expect("Failed to build admin site"),
                ))
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::from(&[7u8; 64]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(pollsite::web::configure),
        )
        .await
    };
}

/// Value of the first `csrf_token` hidden input on a page.
pub fn extract_csrf_token(body: &str) -> Option<String> {
    let marker = "name=\"csrf_token\" value=\"";
    let start = body.find(marker)? + marker.len();
    let end = body[start..].find('"')? + start;
    Some(body[start..end].to_owned())
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}
