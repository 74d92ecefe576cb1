pub mod admin;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Route resolution stops at the first match.
    admin::configure(conf);

    conf.service(actix_files::Files::new("/static", "./static"));
}
