#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use actix_web::{get, post, web, App, HttpResponse, HttpServer};
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::{parse_request, AppState, CpuStressRequest, MemoryStressRequest, StressError};
use crate::metrics::Metrics;
use crate::safety;
use crate::service::ChaosCoordinator;

// Health payload kept byte-compatible with the service this replaces;
// existing probes key on the service string.
const SERVICE_NAME: &str = "chaos-cpp";

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "healthy", "service": SERVICE_NAME}))
}

#[post("/chaos/cpu")]
pub async fn burn_cpu(body: web::Bytes, data: web::Data<AppState>) -> HttpResponse {
    let req: CpuStressRequest = match parse_request(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!(error = %e, "cpu burn: bad request body");
            return stress_error_response("cpu_burn", &e);
        }
    };
    info!(requested_seconds = req.duration_seconds, "cpu burn request");
    match data.coordinator.start_cpu(req.duration_seconds) {
        Ok(duration_seconds) => HttpResponse::Ok().json(json!({
            "type": "cpu_burn",
            "duration_seconds": duration_seconds,
            "max_duration": safety::MAX_CPU_BURN_SECONDS,
            "started": true,
            "completed": false,
        })),
        Err(e) => {
            warn!(error = %e, "cpu burn rejected");
            stress_error_response("cpu_burn", &e)
        }
    }
}

#[post("/chaos/memory")]
pub async fn hold_memory(body: web::Bytes, data: web::Data<AppState>) -> HttpResponse {
    let req: MemoryStressRequest = match parse_request(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!(error = %e, "memory allocation: bad request body");
            return stress_error_response("memory_allocation", &e);
        }
    };
    info!(
        requested_mb = req.megabytes,
        requested_hold_seconds = req.hold_seconds,
        "memory allocation request"
    );
    match data.coordinator.start_memory(req.megabytes, req.hold_seconds) {
        Ok(hold) => HttpResponse::Ok().json(json!({
            "type": "memory_allocation",
            "megabytes": hold.megabytes,
            "max_megabytes": safety::MAX_MEMORY_MB,
            "hold_seconds": hold.hold_seconds,
            "started": true,
            "completed": false,
        })),
        Err(e) => {
            if e == StressError::AllocationFailed {
                error!(requested_mb = req.megabytes, "memory allocation failed");
            } else {
                warn!(error = %e, "memory allocation rejected");
            }
            stress_error_response("memory_allocation", &e)
        }
    }
}

#[get("/chaos/status")]
pub async fn status(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.coordinator.status())
}

#[post("/chaos/stop")]
pub async fn stop_all(data: web::Data<AppState>) -> HttpResponse {
    info!("stop all chaos operations");
    data.coordinator.stop_all();
    HttpResponse::Ok().json(json!({
        "message": "All chaos operations stopped",
        "completed": true,
    }))
}

#[get("/metrics")]
pub async fn scrape_metrics(data: web::Data<AppState>) -> HttpResponse {
    match data.metrics.encode_text() {
        Ok(buf) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buf),
        Err(e) => {
            error!(error = %format!("{e:#}"), "encode metrics failed");
            HttpResponse::InternalServerError().body("encode metrics failed")
        }
    }
}

fn stress_error_response(kind: &str, err: &StressError) -> HttpResponse {
    let mut builder = match err {
        StressError::InvalidInput => HttpResponse::BadRequest(),
        StressError::Conflict(_) => HttpResponse::Conflict(),
        StressError::AllocationFailed => HttpResponse::InternalServerError(),
    };
    builder.json(json!({
        "type": kind,
        "error": err.to_string(),
        "completed": false,
    }))
}

pub async fn serve(bind: &str) -> std::io::Result<()> {
    let metrics = Metrics::new().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, format!("metrics init: {e:#}"))
    })?;
    let state = AppState {
        coordinator: ChaosCoordinator::new(metrics.clone()),
        metrics,
    };
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(health)
            .service(burn_cpu)
            .service(hold_memory)
            .service(status)
            .service(stop_all)
            .service(scrape_metrics)
    })
    .bind(bind)?
    .run()
    .await
}
