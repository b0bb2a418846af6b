//! Types and functions to help building APIs.
use std::result::Result as StdResult;

use hyper::{Body, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type Request = hyper::Request<hyper::Body>;
pub type Result = std::result::Result<hyper::Response<hyper::Body>, AppError>;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Return<T: Serialize> {
    value: T,
    #[serde(rename = "type")]
    kind: &'static str,
    status_code: u16,
}

impl<T: Serialize> Return<T> {
    pub fn new(value: T) -> Return<T> {
        Return {
            value,
            kind: "return",
            status_code: 200,
        }
    }

    pub fn status(self, s: StatusCode) -> Return<T> {
        let status_code = s.as_u16();
        Return { status_code, ..self }
    }

    pub fn build(&self) -> Result {
        let bytes = serde_json::to_vec(self).map_err(unexpected!())?;

        Response::builder()
            .header(hyper::header::CONTENT_TYPE, "application/json")
            .status(StatusCode::from_u16(self.status_code).unwrap())
            .body(Body::from(bytes))
            .map_err(unexpected!())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ErrorReturn {
    value: String,
    #[serde(rename = "type")]
    kind: &'static str,
    error_code: &'static str,
    status_code: u16,
}

pub fn error_response(e: &AppError) -> Response<Body> {
    let body = ErrorReturn {
        value: e.to_string(),
        kind: "error",
        error_code: e.error_code(),
        status_code: e.status_code().as_u16(),
    };
    let bytes = serde_json::to_vec(&body).unwrap_or_else(|_| b"\"error\"".to_vec());
    Response::builder()
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .status(e.status_code())
        .body(Body::from(bytes))
        .expect("failed to build an error response")
}

pub fn parse_query<T>(uri: &hyper::http::Uri) -> StdResult<T, AppError>
where
    for<'de> T: Deserialize<'de>,
{
    let query = uri.query().unwrap_or("");
    serde_urlencoded::from_str(query).map_err(|e| {
        let message = format!("Failed to parse the query in the URI ({})", uri);
        log::debug!("{}: {}", message, e);
        AppError::BadRequest(message)
    })
}

pub async fn parse_body<T>(req: hyper::Request<Body>) -> StdResult<T, AppError>
where
    for<'de> T: Deserialize<'de>,
{
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|_| AppError::BadRequest(String::from("Failed to read the request body")))?;
    serde_json::from_slice(&*body).map_err(|_| AppError::BadRequest(String::from("Failed to parse the request body")))
}

#[derive(Deserialize, Debug, Eq, PartialEq)]
pub struct IdQuery {
    pub id: uuid::Uuid,
}
