//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the catalog: category browsing, global search,
//! document comparison, and the management operations (add, update, delete,
//! reset, import, export).
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with queries, document payloads, backup files
//! - **Output**: JSON responses with documents, search hits, system status
//! - **Endpoints**: Browse, search, compare, manage, health, stats
//!
//! ## Key Features
//! - CORS support for web frontends
//! - Structured error responses
//! - Date-stamped backup downloads

use crate::errors::{CatalogError, Result};
use crate::query::{self, CategoryFilter};
use crate::seed::CATEGORIES;
use crate::store::{is_backup_payload, Confirmation};
use crate::{AppState, Category, Document, DocumentPatch};
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};

/// The API server wrapping shared application state.
pub struct ApiServer {
    app_state: AppState,
}

/// Payload for creating a document; the server assigns the id.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub category: Category,
    pub date: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Query parameters for category browsing
#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    /// Search text; empty or absent means the whole category
    pub q: Option<String>,
}

/// Query parameters for global search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    /// `all` or one category id; defaults to `all`
    pub category: Option<String>,
}

/// Query parameters for the comparison pair
#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub left: String,
    pub right: String,
}

/// Payload gating the destructive reset
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Global search response payload
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<query::SearchHit>,
    pub total_hits: usize,
    pub query_time_ms: u64,
}

/// Comparison pair response payload
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub left: Document,
    pub right: Document,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server until the process shuts down.
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;
        let payload_limit = self.app_state.config.server.max_payload_size_mb * 1024 * 1024;
        let workers = self.app_state.config.performance.worker_threads;
        let app_state = self.app_state;

        tracing::info!("Starting API server on {}", bind_addr);

        let server = HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(app_state.clone()))
                .app_data(web::JsonConfig::default().limit(payload_limit))
                .route("/", web::get().to(index_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
                .route("/categories", web::get().to(categories_handler))
                .route(
                    "/categories/{category}/documents",
                    web::get().to(browse_category_handler),
                )
                .route("/documents", web::get().to(list_documents_handler))
                .route("/documents", web::post().to(create_document_handler))
                .route("/documents/{id}", web::get().to(get_document_handler))
                .route("/documents/{id}", web::patch().to(update_document_handler))
                .route("/documents/{id}", web::delete().to(delete_document_handler))
                .route("/search", web::get().to(search_handler))
                .route("/compare", web::get().to(compare_handler))
                .route("/reset", web::post().to(reset_handler))
                .route("/import", web::post().to(import_handler))
                .route("/export", web::get().to(export_handler))
        })
        .workers(workers)
        .bind(&bind_addr)
        .map_err(|e| CatalogError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?;

        server
            .run()
            .await
            .map_err(|e| CatalogError::Internal {
                message: format!("Server error: {}", e),
            })?;

        Ok(())
    }
}

/// Map a catalog error onto a JSON error response.
fn error_response(err: &CatalogError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status).json(serde_json::json!({
        "error": err.category(),
        "message": err.to_string(),
    }))
}

/// Category browsing endpoint handler
async fn browse_category_handler(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<BrowseParams>,
) -> ActixResult<HttpResponse> {
    let category: Category = match path.into_inner().parse() {
        Ok(c) => c,
        Err(e) => return Ok(error_response(&e)),
    };

    let query = params.q.as_deref().unwrap_or("");
    let docs = app_state.store.documents();
    let matches = query::category_documents(&docs, category, query);

    Ok(HttpResponse::Ok().json(matches))
}

/// Global search endpoint handler
async fn search_handler(
    app_state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> ActixResult<HttpResponse> {
    let start_time = std::time::Instant::now();

    let query = params.q.as_deref().unwrap_or("");
    if query.chars().count() > app_state.config.search.max_query_length {
        return Ok(error_response(&CatalogError::InvalidApiRequest {
            details: format!(
                "Query too long: maximum {} characters",
                app_state.config.search.max_query_length
            ),
        }));
    }

    let filter: CategoryFilter = match params.category.as_deref().unwrap_or("all").parse() {
        Ok(f) => f,
        Err(e) => return Ok(error_response(&e)),
    };

    let docs = app_state.store.documents();
    let hits = query::search_hits(&docs, query, filter, app_state.config.search.snippet_words);

    let response = SearchResponse {
        total_hits: hits.len(),
        hits,
        query_time_ms: start_time.elapsed().as_millis() as u64,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Comparison pair endpoint handler
async fn compare_handler(
    app_state: web::Data<AppState>,
    params: web::Query<CompareParams>,
) -> ActixResult<HttpResponse> {
    let left = app_state.store.find(&params.left);
    let right = app_state.store.find(&params.right);

    match (left, right) {
        (Some(left), Some(right)) => Ok(HttpResponse::Ok().json(CompareResponse { left, right })),
        (None, _) => Ok(error_response(&CatalogError::DocumentNotFound {
            id: params.left.clone(),
        })),
        (_, None) => Ok(error_response(&CatalogError::DocumentNotFound {
            id: params.right.clone(),
        })),
    }
}

/// Category configuration endpoint handler
async fn categories_handler() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(CATEGORIES))
}

/// Full collection listing, for the management surface
async fn list_documents_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(app_state.store.documents()))
}

/// Single document endpoint handler
async fn get_document_handler(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.store.find(&id) {
        Some(doc) => Ok(HttpResponse::Ok().json(doc)),
        None => Ok(error_response(&CatalogError::DocumentNotFound { id })),
    }
}

/// Document creation endpoint handler
async fn create_document_handler(
    app_state: web::Data<AppState>,
    request: web::Json<CreateDocumentRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    if request.title.trim().is_empty() {
        return Ok(error_response(&CatalogError::ValidationFailed {
            field: "title".to_string(),
            reason: "Title must not be empty".to_string(),
        }));
    }

    let doc = Document {
        id: Document::generate_id(),
        title: request.title,
        category: request.category,
        date: request.date.unwrap_or_else(Document::today),
        description: request.description,
        content: request.content.unwrap_or_default(),
        tags: request.tags,
        // The management surface never sets location data.
        location: None,
    };

    app_state.store.add(doc.clone());
    Ok(HttpResponse::Created().json(doc))
}

/// Document update endpoint handler
async fn update_document_handler(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    patch: web::Json<DocumentPatch>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();

    if !app_state.store.update(&id, &patch) {
        return Ok(error_response(&CatalogError::DocumentNotFound { id }));
    }

    match app_state.store.find(&id) {
        Some(doc) => Ok(HttpResponse::Ok().json(doc)),
        None => Ok(error_response(&CatalogError::DocumentNotFound { id })),
    }
}

/// Document deletion endpoint handler
async fn delete_document_handler(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();

    if app_state.store.delete(&id) {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(error_response(&CatalogError::DocumentNotFound { id }))
    }
}

/// Reset endpoint handler; the body must carry an affirmative confirmation.
async fn reset_handler(
    app_state: web::Data<AppState>,
    request: web::Json<ResetRequest>,
) -> ActixResult<HttpResponse> {
    let confirmation = if request.confirm {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    };

    match app_state.store.reset(confirmation) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "reset",
            "total_documents": app_state.store.len(),
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Import endpoint handler: validates the backup payload, then replaces the
/// collection wholesale.
async fn import_handler(
    app_state: web::Data<AppState>,
    payload: web::Json<serde_json::Value>,
) -> ActixResult<HttpResponse> {
    let payload = payload.into_inner();

    if !is_backup_payload(&payload) {
        return Ok(error_response(&CatalogError::InvalidImport {
            reason: "Payload does not look like a catalog backup".to_string(),
        }));
    }

    match app_state.store.import(payload) {
        Ok(count) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "imported",
            "total_documents": count,
        }))),
        Err(e) => {
            tracing::error!("Import rejected: {}", e);
            Ok(error_response(&e))
        }
    }
}

/// Export endpoint handler: the collection as a downloadable backup file.
async fn export_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match app_state.store.export_json() {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                app_state.store.export_filename()
            );
            Ok(HttpResponse::Ok()
                .content_type("application/json")
                .insert_header(("Content-Disposition", disposition))
                .body(body))
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            Ok(error_response(&e))
        }
    }
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let storage_status = match app_state.store.health_check() {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let response = HealthResponse {
        status: storage_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage_status.to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Statistics endpoint handler
async fn stats_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(app_state.store.stats()))
}

/// Index page handler
async fn index_handler() -> ActixResult<HttpResponse> {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Tax Reference Catalog</title>
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; }
            .header { color: #2c3e50; }
            .endpoint { margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 5px; }
            .method { font-weight: bold; color: #27ae60; }
        </style>
    </head>
    <body>
        <h1 class="header">Tax Reference Catalog API</h1>
        <p>Reference catalog for Egyptian tax-law documents: laws, office locations, instructions, decisions and fatwas.</p>

        <h2>Available Endpoints</h2>

        <div class="endpoint">
            <span class="method">GET</span> /categories
            <p>Static category configuration.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /categories/{category}/documents?q=
            <p>Browse one category, optionally filtered by search text.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /search?q=&amp;category=
            <p>Global search across the catalog.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /compare?left=&amp;right=
            <p>Fetch a pair of documents for side-by-side comparison.</p>
        </div>

        <div class="endpoint">
            <span class="method">POST</span> /documents, <span class="method">PATCH</span> /documents/{id}, <span class="method">DELETE</span> /documents/{id}
            <p>Manage the document collection.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /export, <span class="method">POST</span> /import, <span class="method">POST</span> /reset
            <p>Backup, restore and reset the collection.</p>
        </div>
    </body>
    </html>
    "#;

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}
