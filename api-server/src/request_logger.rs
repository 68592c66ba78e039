use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Data, Request, Response};
use std::time::Instant;
use uuid::Uuid;

/// Per-request bookkeeping kept in Rocket's request-local cache.
struct RequestTrace {
    id: String,
    started: Instant,
}

impl RequestTrace {
    fn begin() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..12].to_string(),
            started: Instant::now(),
        }
    }
}

/// Fairing that tags each request with an id, echoes it as `X-Request-Id` and
/// logs one line per request with timing.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(RequestTrace::begin);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let trace = request.local_cache(RequestTrace::begin);

        response.set_header(Header::new("X-Request-Id", trace.id.clone()));

        log::info!(
            "[{}] {} {} -> {} ({:.2}ms)",
            trace.id,
            request.method(),
            request.uri(),
            response.status().code,
            trace.started.elapsed().as_secs_f64() * 1000.0
        );
    }
}
