// src/web/cors_utils.rs
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{Request, Response};

/// Adds CORS headers to every response.
///
/// With the wildcard origin the caller's `Origin` is echoed back, since
/// browsers reject `*` together with credentials.
pub struct Cors {
    allowed_origin: String,
}

impl Cors {
    pub fn new(allowed_origin: impl Into<String>) -> Self {
        Self {
            allowed_origin: allowed_origin.into(),
        }
    }

    fn origin_for(&self, request_origin: Option<&str>) -> String {
        match (self.allowed_origin.as_str(), request_origin) {
            ("*", Some(origin)) => origin.to_string(),
            (allowed, _) => allowed.to_string(),
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let origin = self.origin_for(request.headers().get_one("Origin"));
        response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        if self.allowed_origin == "*" {
            response.set_header(Header::new("Vary", "Origin"));
        }
    }
}

/// Generic CORS handler that returns Status::Ok for any OPTIONS request
#[rocket::options("/<_..>")]
pub async fn universal_options_handler() -> Status {
    Status::Ok
}
