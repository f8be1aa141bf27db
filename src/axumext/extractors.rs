use std::ops::Deref;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json, RequestPartsExt,
};
use serde::de::DeserializeOwned;

use crate::api::ApiErrors;

/// Query string extractor whose rejection renders as an API error.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QueryParams<T>(pub T);

fn map_query_rejection(err: QueryRejection) -> ApiErrors {
    ApiErrors::BadRequest(format!("failed to parse query string: {}", err.body_text()))
}

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = ApiErrors;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = parts
            .extract::<Query<T>>()
            .await
            .map_err(map_query_rejection)?;
        Ok(QueryParams(query))
    }
}

impl<T> Deref for QueryParams<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// JSON body extractor whose rejection renders as an API error.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct JsonPayload<T>(pub T);

fn map_json_rejection(err: JsonRejection) -> ApiErrors {
    match err {
        JsonRejection::MissingJsonContentType(_) => {
            ApiErrors::BadRequest("body must be sent as application/json".to_string())
        }
        JsonRejection::JsonSyntaxError(_) => {
            ApiErrors::BadRequest("body contains badly-formed JSON".to_string())
        }
        other => ApiErrors::BadRequest(other.body_text()),
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiErrors;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(map_json_rejection)?;
        Ok(JsonPayload(payload))
    }
}
