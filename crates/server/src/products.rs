//! HTTP surface for the product catalog.
//!
//! - `POST /api/products/search_and_create` searches the provider and stores the result
//! - `GET /api/products` lists stored products
//! - `DELETE /api/products/{nombre}` removes every product with that name
//!
//! Each route also answers with a trailing slash.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use vitrina_core::domain::product::ProductRecord;
use vitrina_core::errors::{ApplicationError, InterfaceError};

use crate::acquisition::AcquisitionService;

#[derive(Clone)]
pub struct ProductsState {
    service: AcquisitionService,
}

#[derive(Debug, Deserialize)]
pub struct SearchAndCreateRequest {
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    precio: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } | InterfaceError::OperationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        };

        warn!(
            event_name = "products.request.failed",
            correlation_id = self.0.correlation_id(),
            status = status.as_u16(),
            error = %self.0,
            "product request failed"
        );

        let body = ErrorBody {
            error: self.0.message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(service: AcquisitionService) -> Router {
    Router::new()
        .route("/api/products", get(list_products).delete(missing_product_name))
        .route("/api/products/", get(list_products).delete(missing_product_name))
        .route(
            "/api/products/search_and_create",
            post(search_and_create).delete(destroy_search_and_create),
        )
        .route(
            "/api/products/search_and_create/",
            post(search_and_create).delete(destroy_search_and_create),
        )
        .route("/api/products/{nombre}", delete(destroy_product))
        .route("/api/products/{nombre}/", delete(destroy_product))
        .with_state(ProductsState { service })
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

async fn search_and_create(
    State(state): State<ProductsState>,
    payload: Result<Json<SearchAndCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductRecord>), ApiError> {
    let correlation_id = new_correlation_id();
    let Json(request) = payload.map_err(|rejection| {
        ApiError(InterfaceError::BadRequest {
            message: rejection.body_text(),
            correlation_id: correlation_id.clone(),
        })
    })?;

    let record = state
        .service
        .acquire_and_store(request.nombre.as_deref(), request.precio, &correlation_id)
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_products(
    State(state): State<ProductsState>,
) -> Result<Json<Vec<ProductRecord>>, ApiError> {
    let correlation_id = new_correlation_id();
    let records =
        state.service.list().await.map_err(|error| ApiError::application(error, &correlation_id))?;
    Ok(Json(records))
}

async fn destroy_product(
    State(state): State<ProductsState>,
    Path(nombre): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_named(&state, &nombre).await
}

// The static create route shadows `{nombre}` for this one name.
async fn destroy_search_and_create(
    State(state): State<ProductsState>,
) -> Result<StatusCode, ApiError> {
    remove_named(&state, "search_and_create").await
}

async fn remove_named(state: &ProductsState, nombre: &str) -> Result<StatusCode, ApiError> {
    let correlation_id = new_correlation_id();
    let removed = state
        .service
        .remove(nombre, &correlation_id)
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError(InterfaceError::NotFound {
            message: format!("No product named `{nombre}`"),
            correlation_id,
        }))
    }
}

async fn missing_product_name() -> ApiError {
    ApiError::application(
        ApplicationError::Validation("Product name is required".to_string()),
        &new_correlation_id(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use vitrina_core::domain::product::ProductRecord;
    use vitrina_core::search::DEFAULT_IMAGE_URL;
    use vitrina_db::{InMemoryProductRepository, ProductRepository};

    use super::router;
    use crate::acquisition::AcquisitionService;
    use crate::test_support::{FailingRepository, StubSearch};

    fn app(body: Value, repository: Arc<dyn ProductRepository>) -> Router {
        router(AcquisitionService::new(Arc::new(StubSearch::responding(body)), repository))
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request_body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .oneshot(builder.body(request_body).expect("request"))
            .await
            .expect("router responds");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json")
        };
        (status, payload)
    }

    #[tokio::test]
    async fn search_and_create_returns_created_record() {
        let repository = Arc::new(InMemoryProductRepository::default());
        let app =
            app(json!({ "products": [{ "images": ["http://x/img.png"] }] }), repository.clone());

        let (status, payload) = send(
            app,
            Method::POST,
            "/api/products/search_and_create/",
            Some(json!({ "nombre": "Widget", "precio": 9.99 })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            payload,
            json!({ "nombre": "Widget", "precio": 9.99, "imagen_url": "http://x/img.png" })
        );
        assert_eq!(
            repository.list_all().await.expect("list"),
            vec![ProductRecord::new("Widget", Decimal::new(999, 2), "http://x/img.png")]
        );
    }

    #[tokio::test]
    async fn search_and_create_defaults_price_and_image() {
        let app = app(json!({ "products": [{}] }), Arc::new(InMemoryProductRepository::default()));

        let (status, payload) = send(
            app,
            Method::POST,
            "/api/products/search_and_create",
            Some(json!({ "nombre": "Gadget" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payload["precio"], json!(0.0));
        assert_eq!(payload["imagen_url"], json!(DEFAULT_IMAGE_URL));
    }

    #[tokio::test]
    async fn search_and_create_without_name_is_bad_request() {
        let repository = Arc::new(InMemoryProductRepository::default());
        let app = app(json!({ "products": [{}] }), repository.clone());

        let (status, payload) = send(
            app,
            Method::POST,
            "/api/products/search_and_create/",
            Some(json!({ "precio": 3 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], json!("Product name is required"));
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(repository.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn malformed_json_body_is_bad_request() {
        let app = app(json!({ "products": [{}] }), Arc::new(InMemoryProductRepository::default()));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/products/search_and_create/")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");

        let response = app.oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_not_found_is_reported_as_bad_request_with_message() {
        let repository = Arc::new(InMemoryProductRepository::default());
        let app = app(json!({ "products": [] }), repository.clone());

        let (status, payload) = send(
            app,
            Method::POST,
            "/api/products/search_and_create/",
            Some(json!({ "nombre": "Widget", "precio": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], json!("no products found for `Widget`"));
        assert!(repository.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn list_returns_empty_array_then_stored_records() {
        let repository = Arc::new(InMemoryProductRepository::default());

        let (status, payload) =
            send(app(json!({}), repository.clone()), Method::GET, "/api/products/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!([]));

        repository
            .append(ProductRecord::new("Widget", Decimal::new(250, 2), "http://x/img.png"))
            .await
            .expect("append");

        let (status, payload) =
            send(app(json!({}), repository), Method::GET, "/api/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            payload,
            json!([{ "nombre": "Widget", "precio": 2.5, "imagen_url": "http://x/img.png" }])
        );
    }

    #[tokio::test]
    async fn list_surfaces_storage_failure() {
        let (status, payload) =
            send(app(json!({}), Arc::new(FailingRepository)), Method::GET, "/api/products/", None)
                .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"].as_str().is_some_and(|message| message.contains("not a product")));
    }

    #[tokio::test]
    async fn delete_removes_then_reports_not_found() {
        let repository = Arc::new(InMemoryProductRepository::with_records(vec![
            ProductRecord::new("Widget", Decimal::ONE, "http://x/a.png"),
            ProductRecord::new("Gadget", Decimal::ONE, "http://x/b.png"),
        ]));

        let (status, payload) =
            send(app(json!({}), repository.clone()), Method::DELETE, "/api/products/Widget/", None)
                .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(payload, Value::Null);

        let (status, _) =
            send(app(json!({}), repository.clone()), Method::DELETE, "/api/products/Widget", None)
                .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let remaining = repository.list_all().await.expect("list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Gadget");
    }

    #[tokio::test]
    async fn delete_decodes_percent_encoded_names() {
        let repository = Arc::new(InMemoryProductRepository::with_records(vec![
            ProductRecord::new("Red Widget", Decimal::ONE, "http://x/a.png"),
        ]));

        let (status, _) = send(
            app(json!({}), repository.clone()),
            Method::DELETE,
            "/api/products/Red%20Widget/",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(repository.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn product_named_like_the_create_route_can_be_deleted() {
        let repository = Arc::new(InMemoryProductRepository::with_records(vec![
            ProductRecord::new("search_and_create", Decimal::ONE, "http://x/a.png"),
        ]));

        let (status, _) = send(
            app(json!({}), repository.clone()),
            Method::DELETE,
            "/api/products/search_and_create",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(repository.list_all().await.expect("list").is_empty());

        let (status, _) = send(
            app(json!({}), repository),
            Method::DELETE,
            "/api/products/search_and_create/",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_without_key_is_bad_request() {
        let repository = Arc::new(InMemoryProductRepository::default());

        let (status, _) =
            send(app(json!({}), repository.clone()), Method::DELETE, "/api/products/", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(app(json!({}), repository), Method::DELETE, "/api/products/%20%20", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
