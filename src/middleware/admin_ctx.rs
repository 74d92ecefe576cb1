use crate::admin::site::AdminSite;
use crate::messages::{take_messages, Message};
use crate::middleware::csrf::get_or_create_csrf_token;
use actix_session::SessionExt;
use actix_web::dev::Payload;
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{err, ready, Ready};
use std::time::{Duration, Instant};

/// Per-request data every admin page needs.
#[derive(Clone, Debug)]
pub struct AdminCtxInner {
    pub site_header: String,
    pub site_title: String,
    /// CSRF token for form protection
    pub csrf_token: String,
    /// Messages queued by the previous request.
    pub messages: Vec<Message>,
    /// Time the request started for page load statistics.
    pub request_start: Instant,
}

/// Admin context passed to routes.
#[derive(Clone, Debug)]
pub struct AdminCtx(Data<AdminCtxInner>);

impl AdminCtx {
    /// Reuses the context of this request if one was already built.
    fn get_or_create(req: &HttpRequest, site: &AdminSite) -> Result<Self, Error> {
        if let Some(inner) = req.extensions().get::<Data<AdminCtxInner>>() {
            return Ok(Self(inner.clone()));
        }

        // The session borrows request extensions itself; keep our borrows apart.
        let session = req.get_session();
        let inner = Data::new(AdminCtxInner {
            site_header: site.site_header.clone(),
            site_title: site.site_title.clone(),
            csrf_token: get_or_create_csrf_token(&session)?,
            messages: take_messages(&session),
            request_start: Instant::now(),
        });
        req.extensions_mut().insert(inner.clone());
        Ok(Self(inner))
    }

    pub fn get_site_header(&self) -> &str {
        &self.0.site_header
    }

    pub fn get_site_title(&self) -> &str {
        &self.0.site_title
    }

    pub fn get_csrf_token(&self) -> &str {
        &self.0.csrf_token
    }

    pub fn get_messages(&self) -> &[Message] {
        &self.0.messages
    }

    pub fn request_time(&self) -> Duration {
        Instant::now() - self.0.request_start
    }

    /// Human readable request time for the page footer.
    pub fn request_time_as_string(&self) -> String {
        let us = self.request_time().as_micros();
        if us > 5000 {
            format!("{}ms", us / 1000)
        } else {
            format!("{}μs", us)
        }
    }
}

impl FromRequest for AdminCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.app_data::<Data<AdminSite>>() {
            Some(site) => ready(AdminCtx::get_or_create(req, site)),
            None => err(actix_web::error::ErrorServiceUnavailable(
                "Admin site is not configured.",
            )),
        }
    }
}
