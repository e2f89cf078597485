// 📊 Dashboard Models - Static fixture records
// Every record is created once by the mock dataset and read-only afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// SHARED ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Stable => "■",
        }
    }
}

// ============================================================================
// KPI
// ============================================================================

/// Key Performance Indicator card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    /// Pre-formatted display value ("£2.4M", "94.2%")
    pub value: String,
    /// Percentage change versus the prediction
    pub change: f64,
    pub trend: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

// ============================================================================
// FORECAST SERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: String,
    /// `None` for months that have not closed yet
    pub actual: Option<f64>,
    pub predicted: f64,
    pub recurring: f64,
    pub pipeline: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePoint {
    pub month: String,
    pub actual: Option<f64>,
    pub predicted: f64,
    pub recurring: f64,
    pub variable: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub month: String,
    pub inflow: f64,
    pub outflow: f64,
    pub net: f64,
    pub balance: f64,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Sales opportunity with a probability-weighted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDeal {
    pub id: String,
    pub client: String,
    pub value: f64,
    /// Win probability in percent (0-100)
    pub probability: u8,
    pub stage: String,
    pub expected_close: NaiveDate,
    pub source: String,
}

// ============================================================================
// MACRO TRENDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroKind {
    Inflation,
    Fx,
    Seasonal,
}

impl MacroKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MacroKind::Inflation => "inflation",
            MacroKind::Fx => "fx",
            MacroKind::Seasonal => "seasonal",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MacroKind::Inflation => "📈",
            MacroKind::Fx => "💱",
            MacroKind::Seasonal => "📅",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroTrend {
    #[serde(rename = "type")]
    pub kind: MacroKind,
    pub factor: String,
    /// Signed percentage impact on forecasts
    pub impact: f64,
    pub trend: Trend,
    pub description: String,
}

// ============================================================================
// COMPLIANCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    Warning,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Warning => "warning",
            ComplianceStatus::NonCompliant => "non-compliant",
        }
    }
}

/// Regulatory category with a completion score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceMetric {
    pub category: String,
    pub status: ComplianceStatus,
    /// Score in percent (0-100)
    pub score: u32,
    pub requirements: u32,
    pub completed: u32,
    pub next_review: NaiveDate,
}

impl ComplianceMetric {
    pub fn outstanding(&self) -> u32 {
        self.requirements.saturating_sub(self.completed)
    }
}

// ============================================================================
// INVOICE MANAGEMENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Processed,
    Approved,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Processed => "processed",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Paid => "paid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub vendor: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub gl_code: String,
    /// GL auto-coding confidence in percent
    pub confidence: u8,
    pub ai_tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Low => "low",
            AnomalySeverity::Medium => "medium",
            AnomalySeverity::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: AnomalySeverity,
    pub confidence: u8,
    pub recommendation: String,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErpStatus {
    Connected,
    Syncing,
    Error,
}

impl ErpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErpStatus::Connected => "connected",
            ErpStatus::Syncing => "syncing",
            ErpStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErpIntegration {
    pub system: String,
    pub status: ErpStatus,
    pub accuracy: f64,
    pub invoices_processed: u32,
    pub last_sync: String,
    pub ai_features: String,
    pub automation: String,
}

// ============================================================================
// HEADER + ASSISTANT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Warning => "⚠️",
            NotificationKind::Success => "✅",
            NotificationKind::Info => "🤖",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u32,
    pub title: String,
    pub message: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "FinancePro AI",
        }
    }
}

/// One line of the canned assistant transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"non-compliant\"");
        assert_eq!(ComplianceStatus::NonCompliant.as_str(), "non-compliant");

        let kind: MacroKind = serde_json::from_str("\"fx\"").unwrap();
        assert_eq!(kind, MacroKind::Fx);

        println!("✅ Status wire names test passed");
    }

    #[test]
    fn test_deal_serializes_camel_case() {
        let deal = PipelineDeal {
            id: "DEAL-001".to_string(),
            client: "TechCorp".to_string(),
            value: 125000.0,
            probability: 85,
            stage: "Negotiation".to_string(),
            expected_close: NaiveDate::from_ymd_opt(2024, 4, 15).unwrap(),
            source: "Referral".to_string(),
        };

        let value = serde_json::to_value(&deal).unwrap();
        assert_eq!(value["expectedClose"], "2024-04-15");
        assert_eq!(value["probability"], 85);

        println!("✅ Deal serialization test passed");
    }

    #[test]
    fn test_outstanding_requirements_never_negative() {
        let metric = ComplianceMetric {
            category: "Overfilled".to_string(),
            status: ComplianceStatus::Compliant,
            score: 100,
            requirements: 5,
            completed: 7,
            next_review: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };

        assert_eq!(metric.outstanding(), 0);
    }
}
