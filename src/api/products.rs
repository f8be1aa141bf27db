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
        validate_filters, validate_product, Constraint, Filters, Metadata, Product, ProductPatch,
        StoreError, Validator, PRODUCT_SORT_SAFELIST,
    },
};

use super::{
    input::{ensure_valid, read_id, read_int, read_string},
    ApiContext, ApiErrors,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    pub seller_id: i32,
    #[schema(example = "Organic Cotton T-Shirt")]
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub materials_used: String,
    #[serde(default)]
    pub shipping_details: String,
}

impl From<CreateProductRequest> for Product {
    fn from(req: CreateProductRequest) -> Self {
        Product {
            id: 0,
            seller_id: req.seller_id,
            name: req.name,
            description: req.description,
            price: req.price,
            category: req.category,
            materials_used: req.materials_used,
            shipping_details: req.shipping_details,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub metadata: Metadata,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub(crate) struct ProductListParams {
    /// Exact category match
    category: Option<String>,
    #[param(value_type = Option<i64>, minimum = 1)]
    page: Option<String>,
    #[param(value_type = Option<i64>, minimum = 1, maximum = 100)]
    page_size: Option<String>,
    /// One of `id`, `name`, `price`, `category`, prefixed with `-` for descending order
    sort: Option<String>,
}

/// Unknown sellers surface as a field error instead of a conflict.
fn seller_reference(err: StoreError) -> ApiErrors {
    match err {
        StoreError::ConstraintViolation {
            kind: Constraint::ForeignKey,
            ..
        } => {
            let mut v = Validator::new();
            v.add_error("seller_id", "must refer to an existing seller");
            ApiErrors::FailedValidation(v)
        }
        other => other.into(),
    }
}

/// Create product
#[debug_handler]
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = CREATED, description = "Product created", body = Product),
        (status = BAD_REQUEST, description = "Malformed body"),
        (status = UNPROCESSABLE_ENTITY, description = "Failed validation"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_PRODUCTS,
)]
pub(crate) async fn api_create_product(
    State(ctx): State<ApiContext>,
    JsonPayload(payload): JsonPayload<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiErrors> {
    let mut product = Product::from(payload);

    let mut v = Validator::new();
    validate_product(&mut v, &product);
    ensure_valid(v)?;

    ctx.repos
        .products
        .insert(&mut product)
        .await
        .map_err(seller_reference)?;
    info!("Created product {} ({})", product.id, product.name);
    Ok((StatusCode::CREATED, Json(product)))
}

/// List products
#[debug_handler]
#[utoipa::path(
    get,
    path = "/products",
    params(ProductListParams),
    responses(
        (status = OK, description = "One page of products", body = ProductList),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid paging or sort parameters"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_PRODUCTS,
)]
pub(crate) async fn api_list_products(
    State(ctx): State<ApiContext>,
    QueryParams(params): QueryParams<ProductListParams>,
) -> Result<Json<ProductList>, ApiErrors> {
    let mut v = Validator::new();
    let filters = Filters::builder()
        .page(read_int(params.page.as_deref(), 1, "page", &mut v))
        .page_size(read_int(params.page_size.as_deref(), 20, "page_size", &mut v))
        .sort(read_string(params.sort, "id"))
        .sort_safelist(PRODUCT_SORT_SAFELIST)
        .build();
    validate_filters(&mut v, &filters);
    ensure_valid(v)?;

    let category = params.category.filter(|c| !c.is_empty());
    let (products, metadata) = ctx
        .repos
        .products
        .get_all(category.as_deref(), &filters)
        .await?;
    Ok(Json(ProductList { products, metadata }))
}

/// Get product
#[debug_handler]
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id", minimum = 1)),
    responses(
        (status = OK, description = "Product data", body = Product),
        (status = BAD_REQUEST, description = "Invalid id"),
        (status = NOT_FOUND, description = "Product not found"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_PRODUCTS,
)]
pub(crate) async fn api_get_product(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiErrors> {
    let id = read_id(&id)?;
    let product = ctx.repos.products.get(id).await?;
    Ok(Json(product))
}

/// Update product
///
/// Fields missing from the body keep their stored value.
#[debug_handler]
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id", minimum = 1)),
    request_body = ProductPatch,
    responses(
        (status = OK, description = "Updated product", body = Product),
        (status = BAD_REQUEST, description = "Invalid id or malformed body"),
        (status = NOT_FOUND, description = "Product not found"),
        (status = UNPROCESSABLE_ENTITY, description = "Failed validation"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_PRODUCTS,
)]
pub(crate) async fn api_update_product(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    JsonPayload(patch): JsonPayload<ProductPatch>,
) -> Result<Json<Product>, ApiErrors> {
    let id = read_id(&id)?;
    let mut product = ctx.repos.products.get(id).await?;
    patch.apply_to(&mut product);

    let mut v = Validator::new();
    validate_product(&mut v, &product);
    ensure_valid(v)?;

    ctx.repos
        .products
        .update(&mut product)
        .await
        .map_err(seller_reference)?;
    info!("Updated product {}", product.id);
    Ok(Json(product))
}

/// Delete product
#[debug_handler]
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id", minimum = 1)),
    responses(
        (status = OK, description = "Product removed"),
        (status = BAD_REQUEST, description = "Invalid id"),
        (status = NOT_FOUND, description = "Product not found"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_PRODUCTS,
)]
pub(crate) async fn api_delete_product(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiErrors> {
    let id = read_id(&id)?;
    ctx.repos.products.delete(id).await?;
    info!("Deleted product {}", id);
    Ok(Json(json!({ "result": "success" })))
}
