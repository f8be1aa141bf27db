use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    axumext::extractors::{JsonPayload, QueryParams},
    model::{
        validate_filters, validate_seller, Constraint, Filters, Metadata, Seller, SellerPatch,
        StoreError, Validator, SELLER_SORT_SAFELIST,
    },
};

use super::{
    input::{ensure_valid, read_id, read_int, read_string},
    ApiContext, ApiErrors,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSellerRequest {
    #[schema(example = "Clay & Co")]
    pub name: String,
    pub email: String,
    #[schema(write_only)]
    pub password: String,
    pub location: String,
}

impl From<CreateSellerRequest> for Seller {
    fn from(req: CreateSellerRequest) -> Self {
        Seller {
            id: 0,
            name: req.name,
            email: req.email,
            password: req.password,
            location: req.location,
            date_joined: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerList {
    pub sellers: Vec<Seller>,
    pub metadata: Metadata,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub(crate) struct SellerListParams {
    /// Exact location match
    location: Option<String>,
    #[param(value_type = Option<i64>, minimum = 1)]
    page: Option<String>,
    #[param(value_type = Option<i64>, minimum = 1, maximum = 100)]
    page_size: Option<String>,
    /// One of `id`, `name`, `location`, `date_joined`, prefixed with `-` for descending order
    sort: Option<String>,
}

fn duplicate_email(err: StoreError) -> ApiErrors {
    match err {
        StoreError::ConstraintViolation {
            kind: Constraint::Unique,
            ..
        } => {
            let mut v = Validator::new();
            v.add_error("email", "a seller with this email address already exists");
            ApiErrors::FailedValidation(v)
        }
        other => other.into(),
    }
}

/// Register seller
#[debug_handler]
#[utoipa::path(
    post,
    path = "/sellers",
    request_body = CreateSellerRequest,
    responses(
        (status = CREATED, description = "Seller registered", body = Seller),
        (status = BAD_REQUEST, description = "Malformed body"),
        (status = UNPROCESSABLE_ENTITY, description = "Failed validation or duplicate email"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_SELLERS,
)]
pub(crate) async fn api_create_seller(
    State(ctx): State<ApiContext>,
    JsonPayload(payload): JsonPayload<CreateSellerRequest>,
) -> Result<(StatusCode, Json<Seller>), ApiErrors> {
    let mut seller = Seller::from(payload);

    let mut v = Validator::new();
    validate_seller(&mut v, &seller);
    ensure_valid(v)?;

    ctx.repos
        .sellers
        .insert(&mut seller)
        .await
        .map_err(duplicate_email)?;
    info!("Registered seller {} ({})", seller.id, seller.name);
    Ok((StatusCode::CREATED, Json(seller)))
}

/// List sellers
#[debug_handler]
#[utoipa::path(
    get,
    path = "/sellers",
    params(SellerListParams),
    responses(
        (status = OK, description = "One page of sellers", body = SellerList),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid paging or sort parameters"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_SELLERS,
)]
pub(crate) async fn api_list_sellers(
    State(ctx): State<ApiContext>,
    QueryParams(params): QueryParams<SellerListParams>,
) -> Result<Json<SellerList>, ApiErrors> {
    let mut v = Validator::new();
    let filters = Filters::builder()
        .page(read_int(params.page.as_deref(), 1, "page", &mut v))
        .page_size(read_int(params.page_size.as_deref(), 20, "page_size", &mut v))
        .sort(read_string(params.sort, "id"))
        .sort_safelist(SELLER_SORT_SAFELIST)
        .build();
    validate_filters(&mut v, &filters);
    ensure_valid(v)?;

    let location = params.location.filter(|l| !l.is_empty());
    let (sellers, metadata) = ctx
        .repos
        .sellers
        .get_all(location.as_deref(), &filters)
        .await?;
    Ok(Json(SellerList { sellers, metadata }))
}

/// Get seller
#[debug_handler]
#[utoipa::path(
    get,
    path = "/sellers/{id}",
    params(("id" = i32, Path, description = "Seller id", minimum = 1)),
    responses(
        (status = OK, description = "Seller data", body = Seller),
        (status = BAD_REQUEST, description = "Invalid id"),
        (status = NOT_FOUND, description = "Seller not found"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_SELLERS,
)]
pub(crate) async fn api_get_seller(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Seller>, ApiErrors> {
    let id = read_id(&id)?;
    let seller = ctx.repos.sellers.get(id).await?;
    Ok(Json(seller))
}

/// Update seller
///
/// Fields missing from the body keep their stored value. The join date
/// cannot be changed.
#[debug_handler]
#[utoipa::path(
    put,
    path = "/sellers/{id}",
    params(("id" = i32, Path, description = "Seller id", minimum = 1)),
    request_body = SellerPatch,
    responses(
        (status = OK, description = "Updated seller", body = Seller),
        (status = BAD_REQUEST, description = "Invalid id or malformed body"),
        (status = NOT_FOUND, description = "Seller not found"),
        (status = UNPROCESSABLE_ENTITY, description = "Failed validation or duplicate email"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_SELLERS,
)]
pub(crate) async fn api_update_seller(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    JsonPayload(patch): JsonPayload<SellerPatch>,
) -> Result<Json<Seller>, ApiErrors> {
    let id = read_id(&id)?;
    let mut seller = ctx.repos.sellers.get(id).await?;
    patch.apply_to(&mut seller);

    let mut v = Validator::new();
    validate_seller(&mut v, &seller);
    ensure_valid(v)?;

    ctx.repos
        .sellers
        .update(&mut seller)
        .await
        .map_err(duplicate_email)?;
    info!("Updated seller {}", seller.id);
    Ok(Json(seller))
}

/// Delete seller
///
/// The seller's products are removed with it.
#[debug_handler]
#[utoipa::path(
    delete,
    path = "/sellers/{id}",
    params(("id" = i32, Path, description = "Seller id", minimum = 1)),
    responses(
        (status = OK, description = "Seller removed"),
        (status = BAD_REQUEST, description = "Invalid id"),
        (status = NOT_FOUND, description = "Seller not found"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_SELLERS,
)]
pub(crate) async fn api_delete_seller(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiErrors> {
    let id = read_id(&id)?;
    ctx.repos.sellers.delete(id).await?;
    info!("Deleted seller {}", id);
    Ok(Json(json!({ "result": "success" })))
}
