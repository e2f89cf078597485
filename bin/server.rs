// AI FinancePro - Web Server
// Mock dashboard data as JSON, the audit report as a download, and an
// embeddable shell page

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use financepro::analytics::{
    CashFlowSummary, ComplianceOverview, DealInsight, PipelineSummary,
};
use financepro::{
    logging, AuditReport, DashboardConfig, EmbedPolicy, MockDataset, APP_NAME, VERSION,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
struct AppState {
    data: Arc<MockDataset>,
    embed: Arc<EmbedPolicy>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct ForecastResponse<'a> {
    revenue: &'a [financepro::RevenuePoint],
    expenses: &'a [financepro::ExpensePoint],
}

#[derive(Serialize)]
struct CashFlowResponse<'a> {
    series: &'a [financepro::CashFlowPoint],
    summary: CashFlowSummary,
}

#[derive(Serialize)]
struct PipelineResponse<'a> {
    deals: &'a [financepro::PipelineDeal],
    summary: PipelineSummary,
}

#[derive(Serialize)]
struct DealResponse<'a> {
    deal: &'a financepro::PipelineDeal,
    insight: DealInsight,
}

#[derive(Serialize)]
struct InvoicesResponse<'a> {
    invoices: &'a [financepro::Invoice],
    anomalies: &'a [financepro::Anomaly],
    integrations: &'a [financepro::ErpIntegration],
}

#[derive(Serialize)]
struct ComplianceResponse<'a> {
    metrics: &'a [financepro::ComplianceMetric],
    overview: ComplianceOverview,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/kpis
async fn get_kpis(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(&state.data.kpis)).into_response()
}

/// GET /api/forecast - Revenue and expense series
async fn get_forecast(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(ForecastResponse {
        revenue: &state.data.revenue,
        expenses: &state.data.expenses,
    }))
    .into_response()
}

/// GET /api/cashflow
async fn get_cash_flow(State(state): State<AppState>) -> impl IntoResponse {
    let series = &state.data.cash_flow;
    Json(ApiResponse::ok(CashFlowResponse {
        series,
        summary: CashFlowSummary::from_points(series),
    }))
    .into_response()
}

/// GET /api/pipeline
async fn get_pipeline(State(state): State<AppState>) -> impl IntoResponse {
    let deals = &state.data.pipeline;
    Json(ApiResponse::ok(PipelineResponse {
        deals,
        summary: PipelineSummary::from_deals(deals),
    }))
    .into_response()
}

/// GET /api/pipeline/:id - One deal with its AI insight
async fn get_deal(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.data.deal(&id) {
        Some(deal) => (
            StatusCode::OK,
            Json(ApiResponse::ok(DealResponse {
                deal,
                insight: DealInsight::for_deal(deal),
            })),
        )
            .into_response(),
        None => {
            warn!(deal = %id, "unknown deal requested");
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(format!("deal {} not found", id))),
            )
                .into_response()
        }
    }
}

/// GET /api/macro
async fn get_macro(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(&state.data.macro_trends)).into_response()
}

/// GET /api/invoices - Invoices, anomalies and ERP integrations
async fn get_invoices(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(InvoicesResponse {
        invoices: &state.data.invoices,
        anomalies: &state.data.anomalies,
        integrations: &state.data.erp_integrations,
    }))
    .into_response()
}

/// GET /api/compliance
async fn get_compliance(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.data.compliance;
    Json(ApiResponse::ok(ComplianceResponse {
        metrics,
        overview: ComplianceOverview::from_metrics(metrics),
    }))
    .into_response()
}

/// GET /api/compliance/audit - Plain-text report as an attachment
async fn download_audit(State(state): State<AppState>) -> impl IntoResponse {
    let report = AuditReport::build(&state.data.compliance, Utc::now());
    let file_name = report.file_name();
    info!(report_id = %report.report_id, overall_score = report.overall_score, "audit report served");

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        report.render(),
    )
}

/// GET / - Shell page with the iframe resize script
async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    Html(state.embed.shell_page(APP_NAME))
}

// ============================================================================
// Router
// ============================================================================

fn build_router(state: AppState) -> Result<Router> {
    let csp = HeaderValue::from_str(&state.embed.content_security_policy())?;

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/kpis", get(get_kpis))
        .route("/forecast", get(get_forecast))
        .route("/cashflow", get(get_cash_flow))
        .route("/pipeline", get(get_pipeline))
        .route("/pipeline/:id", get(get_deal))
        .route("/macro", get(get_macro))
        .route("/invoices", get(get_invoices))
        .route("/compliance", get(get_compliance))
        .route("/compliance/audit", get(download_audit))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(CorsLayer::permissive());

    Ok(app)
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = DashboardConfig::from_env()?;
    logging::init_stdout("info")?;

    println!("🌐 {} v{} - Web Server", APP_NAME, VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Create shared state
    let state = AppState {
        data: Arc::new(MockDataset::load()),
        embed: Arc::new(EmbedPolicy::new(config.parent_origin.clone())),
    };

    let app = build_router(state)?;

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, parent_origin = %config.parent_origin, "server listening");

    println!("\n🚀 Server running on http://{}", config.bind);
    println!("   API: http://{}/api/kpis", config.bind);
    println!("   UI:  http://{}", config.bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_router() -> Router {
        build_router(AppState {
            data: Arc::new(MockDataset::load()),
            embed: Arc::new(EmbedPolicy::default()),
        })
        .unwrap()
    }

    async fn get_path(path: &str) -> axum::response::Response {
        create_router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_envelope() {
        let response = get_path("/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_framing_headers() {
        let response = get_path("/").await;

        assert_eq!(
            response.headers()[header::X_FRAME_OPTIONS],
            HeaderValue::from_static("SAMEORIGIN")
        );
        let csp = response.headers()[header::CONTENT_SECURITY_POLICY]
            .to_str()
            .unwrap()
            .to_string();
        assert!(csp.contains("https://*.executasolutions.com"));

        let page = body_text(response).await;
        assert!(page.contains("iframe-resize"));
    }

    #[tokio::test]
    async fn test_deal_lookup() {
        let response = get_path("/api/pipeline/DEAL-002").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["data"]["deal"]["client"], "Global Retail Group");

        let missing = get_path("/api/pipeline/DEAL-999").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body_text(missing).await).unwrap();
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_deal_id_decoded_once() {
        let encoded = get_path("/api/pipeline/DEAL%2D002").await;
        assert_eq!(encoded.status(), StatusCode::OK);

        // %25 decodes to a literal '%', which must not be decoded again
        let double = get_path("/api/pipeline/%2544EAL-002").await;
        assert_eq!(double.status(), StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body_text(double).await).unwrap();
        assert_eq!(json["error"], "deal %44EAL-002 not found");
    }

    #[tokio::test]
    async fn test_audit_download() {
        let response = get_path("/api/compliance/audit").await;
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"AI_Compliance_Audit_Report_AI-AUDIT-"));

        let text = body_text(response).await;
        assert!(text.contains("Financial Reporting"));
    }
}
