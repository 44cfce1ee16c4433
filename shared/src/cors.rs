use lambda_http::http::header::{HeaderValue, VARY};
use lambda_http::{Body, Response};

/// Value for `Access-Control-Allow-Origin`. With no allow-list every origin
/// gets `*`; otherwise the request origin is echoed back only when listed,
/// falling back to the first listed origin.
pub fn cors_origin(allowed: &[String], request_origin: Option<&str>) -> String {
    if allowed.is_empty() {
        return "*".to_string();
    }

    match request_origin.map(|o| o.trim_end_matches('/')) {
        Some(origin) if allowed.iter().any(|a| a == origin) => origin.to_string(),
        _ => allowed[0].clone(),
    }
}

pub fn with_cors_headers(
    mut resp: Response<Body>,
    allowed: &[String],
    request_origin: Option<&str>,
) -> Response<Body> {
    let origin = cors_origin(allowed, request_origin);

    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(&origin).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    headers.insert(
        "Access-Control-Expose-Headers",
        HeaderValue::from_static("Content-Disposition"),
    );
    if !allowed.is_empty() {
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }

    resp
}
