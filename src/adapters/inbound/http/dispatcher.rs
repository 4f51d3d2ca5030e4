//! Decoding of the three request encodings and the status policy for responses.

use crate::adapters::inbound::http::error::ApiError;
use crate::app::App;
use async_graphql::{Request, Response as GraphQLResponse, Variables};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

pub const GRAPHQL_CONTENT_TYPE: &str = "application/graphql";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Default, Deserialize)]
struct UrlParams {
    query: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    query: String,
    #[serde(default, rename = "operationName")]
    operation_name: Option<String>,
    #[serde(default)]
    variables: Option<serde_json::Value>,
}

fn non_blank(query: String) -> Result<String, ApiError> {
    if query.trim().is_empty() {
        Err(ApiError::InvalidRequest(String::from("Query must not be blank")))
    } else {
        Ok(query)
    }
}

fn with_operation(request: Request, operation_name: Option<String>) -> Request {
    match operation_name.filter(|name| !name.is_empty()) {
        Some(name) => request.operation_name(name),
        None => request,
    }
}

/// `GET /query?query=...`
pub fn decode_url(uri: &Uri) -> Result<Request, ApiError> {
    let Query(params) = Query::<UrlParams>::try_from_uri(uri)
        .map_err(|why| ApiError::InvalidRequest(why.body_text()))?;
    let query = non_blank(params.query.unwrap_or_default())?;
    Ok(with_operation(Request::new(query), params.operation_name))
}

/// `POST /query`, raw `application/graphql` or the JSON envelope for anything else.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<Request, ApiError> {
    let is_graphql = content_type
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(GRAPHQL_CONTENT_TYPE));

    if is_graphql {
        let query = std::str::from_utf8(body)
            .map_err(|_| ApiError::InvalidRequest(String::from("Query body is not UTF-8")))?;
        return Ok(Request::new(non_blank(query.to_string())?));
    }

    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|why| ApiError::InvalidRequest(format!("Malformed request envelope: {why}")))?;
    let mut request = Request::new(non_blank(envelope.query)?);
    if let Some(variables) = envelope.variables.filter(|value| !value.is_null()) {
        request = request.variables(Variables::from_json(variables));
    }
    Ok(with_operation(request, envelope.operation_name))
}

/// 200 without errors, 400 when a request never reached a resolver, 500 otherwise.
#[must_use]
pub fn status_for(response: &GraphQLResponse) -> StatusCode {
    if response.errors.is_empty() {
        StatusCode::OK
    } else if response.errors.iter().all(|error| error.path.is_empty()) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub fn encode(response: &GraphQLResponse) -> Response {
    match serde_json::to_vec(response) {
        Ok(body) => (
            status_for(response),
            [(CONTENT_TYPE, JSON_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(why) => ApiError::Internal(format!("Failed to encode response - {why}")).into_response(),
    }
}

/// Echoes the id every log line of the request carries.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn with_request_id(mut response: Response, request_id: Uuid) -> Response {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub async fn query(
    State(app): State<App>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let context = app.request_context().await;
    let request_id = context.request_id;

    let request = match method {
        Method::GET => decode_url(&uri),
        Method::POST => {
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            decode_body(content_type, &body)
        }
        _ => Err(ApiError::MethodNotAllowed),
    };
    let request = match request {
        Ok(request) => request,
        Err(why) => {
            log::info!("[{request_id}] Rejected {method} {uri} - {why}");
            return with_request_id(why.into_response(), request_id);
        }
    };

    log::info!("[{request_id}] {method} {}", uri.path());

    let services = app.services().await;
    let response = services.schema.execute(request.data(context)).await;
    if !response.errors.is_empty() {
        log::warn!(
            "[{request_id}] Finished with {} errors",
            response.errors.len()
        );
    }
    with_request_id(encode(&response), request_id)
}
