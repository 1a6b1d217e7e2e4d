//! Local HTTP stand-ins for the embedding services.

use actix_web::http::header;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::json;

pub(crate) const API_KEY: &str = "key";
const BEARER: &str = "Bearer key";

/// Serve `configure` on an ephemeral local port and return its base URL.
///
/// Must be called from inside an actix system (`#[actix_web::test]`).
pub(crate) fn serve<F>(configure: F) -> String
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind local server");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

/// 401 response unless the request carries [`API_KEY`] as a bearer token.
pub(crate) fn check_auth(req: &HttpRequest) -> Option<HttpResponse> {
    let sent = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if sent == Some(BEARER) {
        return None;
    }
    Some(HttpResponse::Unauthorized().json(json!({"message": "invalid api token"})))
}

/// 200 with a body no provider can decode.
pub(crate) async fn garbage() -> HttpResponse {
    HttpResponse::Ok().json(json!({"garbage": 1}))
}
