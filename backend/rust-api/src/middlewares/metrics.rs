use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Collections whose next path segment is a resource id.
const ID_COLLECTIONS: [&str; 3] = ["quizzes", "questions", "attempts"];

/// Static routes that sit where an id would otherwise be.
const STATIC_SEGMENTS: [&str; 1] = ["my"];

/// Records request count and latency per method, route and status.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(req.uri().path()),
    };

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &route, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &route])
        .observe(duration);

    response
}

/// Route label for requests the router did not match. Any segment following
/// a quiz, question or attempt collection becomes `{id}`, so unknown ids
/// share one label.
fn normalize_path(path: &str) -> String {
    let mut previous = "";
    let mut normalized = Vec::new();

    for segment in path.split('/') {
        if is_id_position(previous, segment) {
            normalized.push("{id}");
        } else {
            normalized.push(segment);
        }
        previous = segment;
    }

    normalized.join("/")
}

fn is_id_position(previous: &str, segment: &str) -> bool {
    !segment.is_empty()
        && ID_COLLECTIONS.contains(&previous)
        && !STATIC_SEGMENTS.contains(&segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/v1/attempts/550e8400-e29b-41d4-a716-446655440000"),
            "/api/v1/attempts/{id}"
        );
        assert_eq!(
            normalize_path("/api/v1/admin/quizzes/capitals/questions"),
            "/api/v1/admin/quizzes/{id}/questions"
        );
        assert_eq!(
            normalize_path("/api/v1/admin/questions/q-17"),
            "/api/v1/admin/questions/{id}"
        );
        assert_eq!(normalize_path("/api/v1/attempts/my"), "/api/v1/attempts/my");
        assert_eq!(normalize_path("/api/v1/quizzes/"), "/api/v1/quizzes/");
        assert_eq!(normalize_path("/health"), "/health");
    }
}
