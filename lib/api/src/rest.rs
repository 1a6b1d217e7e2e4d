use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shapeshift_core::{Error, MatchReport, Shapeshifter};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Deserialize)]
struct ShapeshiftRequest {
    source: Value,
    target: Value,
    #[serde(default)]
    report: bool,
}

#[derive(Serialize)]
struct ShapeshiftResponse {
    result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<MatchReport>,
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    provider: &'a str,
    model: &'a str,
    threshold: f32,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(shapeshifter: Arc<Shapeshifter>, port: u16) -> std::io::Result<()> {
        info!("REST API listening on 0.0.0.0:{}", port);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .configure(Self::configure(shapeshifter.clone()))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register state and routes on an app; also used by the handler tests.
    pub fn configure(shapeshifter: Arc<Shapeshifter>) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg| {
            cfg.app_data(web::Data::new(shapeshifter))
                .route("/health", web::get().to(health))
                .route("/shapeshift", web::post().to(shapeshift));
        }
    }
}

async fn health(shapeshifter: web::Data<Arc<Shapeshifter>>) -> ActixResult<HttpResponse> {
    let provider = shapeshifter.provider();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        provider: provider.name(),
        model: provider.model(),
        threshold: shapeshifter.threshold(),
    }))
}

async fn shapeshift(
    shapeshifter: web::Data<Arc<Shapeshifter>>,
    req: web::Json<ShapeshiftRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();

    match shapeshifter.shapeshift_with_report(&req.source, &req.target).await {
        Ok(shifted) => Ok(HttpResponse::Ok().json(ShapeshiftResponse {
            result: shifted.tree,
            report: req.report.then_some(shifted.report),
        })),
        Err(e) => {
            warn!(error = %e, "shapeshift request failed");
            Ok(error_response(&e))
        }
    }
}

fn error_response(e: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        Error::InvalidInput(_) | Error::StructuralAmbiguity { .. } => {
            HttpResponse::BadRequest().json(body)
        }
        Error::Provider { .. } | Error::DimensionMismatch { .. } => {
            HttpResponse::BadGateway().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}
