use crate::domain::error::AppError;
use crate::domain::query::QueryRequest;
use crate::infrastructure::bootstrap::AppState;
use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use validator::Validate;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatus {
    database_reachable: bool,
    model_client_ready: bool,
    table_count: usize,
}

#[derive(Serialize)]
struct ServiceInfo {
    message: &'static str,
    version: &'static str,
    health: &'static str,
}

#[post("/query")]
async fn query(data: web::Data<AppState>, req: web::Json<QueryRequest>) -> impl Responder {
    if let Err(e) = req.validate() {
        return HttpResponse::BadRequest().body(e.to_string());
    }

    match data.pipeline.answer(&req.question).await {
        // Per-query terminals (empty SQL, rejected statement, success) are
        // all well-formed 200 envelopes; only service faults get an error
        // status.
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            error!("Query failed: {}", e);
            match e {
                AppError::ModelUnavailable(_) | AppError::ConnectionFailed(_) => {
                    HttpResponse::ServiceUnavailable().body(e.to_string())
                }
                _ => HttpResponse::InternalServerError().body(e.to_string()),
            }
        }
    }
}

#[get("/health")]
async fn health(data: web::Data<AppState>) -> impl Responder {
    let database_reachable = data.catalog.check_connectivity().await;

    HttpResponse::Ok().json(HealthStatus {
        database_reachable,
        model_client_ready: data.readiness.model_ready,
        table_count: data.table_count,
    })
}

#[get("/")]
async fn root() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfo {
        message: "askdb analytics API",
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
    })
}

pub fn start_http_server(
    state: Arc<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let data = web::Data::from(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(data.clone())
            .service(query)
            .service(health)
            .service(root)
    })
    .bind((host.to_string(), port))?
    .run();

    Ok(server)
}
