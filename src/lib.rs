// AI FinancePro Dashboard - Core Library
// Exposes all modules for use in the terminal UI, the HTTP server, and tests

pub mod error;
pub mod models;
pub mod data;           // Mock data fixtures
pub mod analytics;      // Derived panel numbers (scores, totals, tones)
pub mod sequencer;      // Clock, cancel token, staged sequencer
pub mod export;         // Report sinks ("downloads")
pub mod audit;          // Compliance audit report content
pub mod generator;      // Staged audit generator
pub mod theme;
pub mod config;
pub mod state;          // Tab controller + view state
pub mod embed;          // Iframe resize contract + framing policy
pub mod logging;

// Re-export commonly used types
pub use error::{AuditError, ConfigError, ExportError, FinanceError, Result};
pub use models::{
    Anomaly, ChatMessage, ChatRole, CashFlowPoint, ComplianceMetric, ComplianceStatus,
    ErpIntegration, ExpensePoint, Invoice, InvoiceStatus, Kpi, MacroKind, MacroTrend,
    Notification, PipelineDeal, RevenuePoint, Trend,
};
pub use data::MockDataset;
pub use analytics::{
    overall_compliance_score, CashFlowSummary, ComplianceOverview, DealInsight,
    PipelineSummary,
};
pub use sequencer::{
    CancelToken, Clock, DelayPolicy, ManualClock, Stage, StagedSequencer, SystemClock,
};
pub use export::{deliver_or_skip, Delivery, DirectorySink, DisabledSink, ReportSink};
pub use audit::AuditReport;
pub use generator::{audit_stages, AuditGenerator, GeneratorEvent, GENERATED_DISPLAY};
pub use theme::{Palette, Theme};
pub use config::DashboardConfig;
pub use state::{DashboardState, Dropdown, InvoiceView, Tab};
pub use embed::{EmbedPolicy, ResizeMessage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product name shown in headers and reports
pub const APP_NAME: &str = "AI FinancePro";
