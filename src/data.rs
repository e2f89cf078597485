// 🗂️ Mock Dataset - Hard-coded fixtures for every dashboard panel
//
// There is no ingestion: the dataset is built once at startup and shared
// read-only (the server wraps it in an Arc).

use crate::models::*;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MockDataset {
    pub kpis: Vec<Kpi>,
    pub revenue: Vec<RevenuePoint>,
    pub expenses: Vec<ExpensePoint>,
    pub cash_flow: Vec<CashFlowPoint>,
    pub pipeline: Vec<PipelineDeal>,
    pub macro_trends: Vec<MacroTrend>,
    pub compliance: Vec<ComplianceMetric>,
    pub invoices: Vec<Invoice>,
    pub anomalies: Vec<Anomaly>,
    pub erp_integrations: Vec<ErpIntegration>,
    pub notifications: Vec<Notification>,
    pub assistant_transcript: Vec<ChatMessage>,
}

impl MockDataset {
    pub fn load() -> Self {
        MockDataset {
            kpis: kpis(),
            revenue: revenue_data(),
            expenses: expense_data(),
            cash_flow: cash_flow_data(),
            pipeline: pipeline_deals(),
            macro_trends: macro_trends(),
            compliance: compliance_metrics(),
            invoices: invoices(),
            anomalies: detected_anomalies(),
            erp_integrations: erp_integrations(),
            notifications: notifications(),
            assistant_transcript: assistant_transcript(),
        }
    }

    pub fn deal(&self, id: &str) -> Option<&PipelineDeal> {
        self.pipeline.iter().find(|d| d.id == id)
    }
}

impl Default for MockDataset {
    fn default() -> Self {
        Self::load()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Fixture dates are literals; an invalid one is a programming error.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn kpi(label: &str, value: &str, change: f64, trend: Trend, target: Option<&str>) -> Kpi {
    Kpi {
        label: label.to_string(),
        value: value.to_string(),
        change,
        trend,
        target: target.map(|t| t.to_string()),
    }
}

pub fn kpis() -> Vec<Kpi> {
    vec![
        kpi("Monthly Revenue", "£1.42M", 12.4, Trend::Up, Some("£1.5M")),
        kpi("Operating Expenses", "£534K", -3.1, Trend::Down, Some("£550K")),
        kpi("Gross Margin", "62.4%", 2.8, Trend::Up, Some("65%")),
        kpi("Days Sales Outstanding", "38 days", 4.2, Trend::Down, Some("30 days")),
        kpi("Cash Runway", "18 months", 0.0, Trend::Stable, None),
        kpi("Pipeline Coverage", "3.2x", -1.5, Trend::Up, Some("3.5x")),
    ]
}

fn revenue(month: &str, actual: Option<f64>, predicted: f64, recurring: f64, pipeline: f64) -> RevenuePoint {
    RevenuePoint {
        month: month.to_string(),
        actual,
        predicted,
        recurring,
        pipeline,
    }
}

pub fn revenue_data() -> Vec<RevenuePoint> {
    vec![
        revenue("Jan", Some(1_180_000.0), 1_150_000.0, 820_000.0, 310_000.0),
        revenue("Feb", Some(1_210_000.0), 1_200_000.0, 835_000.0, 340_000.0),
        revenue("Mar", Some(1_265_000.0), 1_240_000.0, 850_000.0, 365_000.0),
        revenue("Apr", Some(1_300_000.0), 1_290_000.0, 868_000.0, 390_000.0),
        revenue("May", Some(1_355_000.0), 1_340_000.0, 880_000.0, 420_000.0),
        revenue("Jun", Some(1_420_000.0), 1_390_000.0, 901_000.0, 455_000.0),
        revenue("Jul", None, 1_460_000.0, 915_000.0, 480_000.0),
        revenue("Aug", None, 1_510_000.0, 930_000.0, 505_000.0),
        revenue("Sep", None, 1_575_000.0, 948_000.0, 540_000.0),
    ]
}

fn expense(month: &str, actual: Option<f64>, predicted: f64, recurring: f64, variable: f64) -> ExpensePoint {
    ExpensePoint {
        month: month.to_string(),
        actual,
        predicted,
        recurring,
        variable,
    }
}

pub fn expense_data() -> Vec<ExpensePoint> {
    vec![
        expense("Jan", Some(505_000.0), 510_000.0, 380_000.0, 125_000.0),
        expense("Feb", Some(512_000.0), 515_000.0, 382_000.0, 130_000.0),
        expense("Mar", Some(528_000.0), 520_000.0, 385_000.0, 143_000.0),
        expense("Apr", Some(519_000.0), 525_000.0, 388_000.0, 131_000.0),
        expense("May", Some(541_000.0), 530_000.0, 390_000.0, 151_000.0),
        expense("Jun", Some(534_000.0), 538_000.0, 392_000.0, 142_000.0),
        expense("Jul", None, 545_000.0, 395_000.0, 150_000.0),
        expense("Aug", None, 552_000.0, 398_000.0, 154_000.0),
        expense("Sep", None, 560_000.0, 400_000.0, 160_000.0),
    ]
}

fn cash(month: &str, inflow: f64, outflow: f64, balance: f64) -> CashFlowPoint {
    CashFlowPoint {
        month: month.to_string(),
        inflow,
        outflow,
        net: inflow - outflow,
        balance,
    }
}

pub fn cash_flow_data() -> Vec<CashFlowPoint> {
    vec![
        cash("Jan", 120_000.0, 85_000.0, 144_000.0),
        cash("Feb", 128_000.0, 88_000.0, 184_000.0),
        cash("Mar", 125_000.0, 92_000.0, 217_000.0),
        cash("Apr", 132_000.0, 87_000.0, 262_000.0),
        cash("May", 118_000.0, 90_000.0, 290_000.0),
        cash("Jun", 141_000.0, 92_000.0, 339_000.0),
    ]
}

fn deal(
    id: &str,
    client: &str,
    value: f64,
    probability: u8,
    stage: &str,
    expected_close: NaiveDate,
    source: &str,
) -> PipelineDeal {
    PipelineDeal {
        id: id.to_string(),
        client: client.to_string(),
        value,
        probability,
        stage: stage.to_string(),
        expected_close,
        source: source.to_string(),
    }
}

pub fn pipeline_deals() -> Vec<PipelineDeal> {
    vec![
        deal("DEAL-001", "TechCorp Industries", 185_000.0, 85, "Contract Review", date(2024, 4, 15), "Referral"),
        deal("DEAL-002", "Global Retail Group", 120_000.0, 70, "Negotiation", date(2024, 4, 30), "Website"),
        deal("DEAL-003", "FinServe Partners", 95_000.0, 60, "Proposal Sent", date(2024, 5, 20), "LinkedIn"),
        deal("DEAL-004", "HealthPlus Clinics", 75_000.0, 40, "Initial Meeting", date(2024, 6, 10), "Trade Show"),
        deal("DEAL-005", "Nordic Logistics AB", 150_000.0, 25, "Discovery", date(2024, 7, 1), "Cold Outreach"),
    ]
}

fn trend(kind: MacroKind, factor: &str, impact: f64, trend: Trend, description: &str) -> MacroTrend {
    MacroTrend {
        kind,
        factor: factor.to_string(),
        impact,
        trend,
        description: description.to_string(),
    }
}

pub fn macro_trends() -> Vec<MacroTrend> {
    vec![
        trend(
            MacroKind::Inflation,
            "UK CPI Inflation",
            6.7,
            Trend::Up,
            "Rising input costs expected to push supplier pricing higher through Q3",
        ),
        trend(
            MacroKind::Fx,
            "GBP/USD Exchange Rate",
            -3.2,
            Trend::Down,
            "Weaker sterling lifts the value of USD-denominated contracts",
        ),
        trend(
            MacroKind::Seasonal,
            "Q4 Seasonal Demand",
            12.5,
            Trend::Up,
            "Historical year-end budget flush drives a spike in closed deals",
        ),
        trend(
            MacroKind::Inflation,
            "Wage Growth Pressure",
            2.1,
            Trend::Stable,
            "Salary benchmarks stable after the annual review cycle",
        ),
    ]
}

fn metric(
    category: &str,
    status: ComplianceStatus,
    score: u32,
    requirements: u32,
    completed: u32,
    next_review: NaiveDate,
) -> ComplianceMetric {
    ComplianceMetric {
        category: category.to_string(),
        status,
        score,
        requirements,
        completed,
        next_review,
    }
}

pub fn compliance_metrics() -> Vec<ComplianceMetric> {
    vec![
        metric("Financial Reporting", ComplianceStatus::Compliant, 95, 24, 24, date(2024, 6, 30)),
        metric("Data Protection (GDPR)", ComplianceStatus::Warning, 82, 18, 15, date(2024, 5, 15)),
        metric("Anti-Money Laundering", ComplianceStatus::Compliant, 92, 20, 19, date(2024, 7, 1)),
        metric("Tax Filing", ComplianceStatus::Warning, 78, 16, 13, date(2024, 4, 30)),
        metric("Internal Controls (SOX)", ComplianceStatus::NonCompliant, 65, 22, 14, date(2024, 5, 1)),
        metric("Vendor Risk Management", ComplianceStatus::Compliant, 88, 12, 11, date(2024, 8, 15)),
    ]
}

pub fn invoices() -> Vec<Invoice> {
    let tags = |t: &[&str]| t.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    vec![
        Invoice {
            id: "INV-2024-001".to_string(),
            vendor: "CloudTech Solutions".to_string(),
            amount: 4500.0,
            status: InvoiceStatus::Processed,
            due_date: date(2024, 4, 15),
            gl_code: "4000".to_string(),
            confidence: 97,
            ai_tags: tags(&["Software License", "Recurring"]),
        },
        Invoice {
            id: "INV-2024-002".to_string(),
            vendor: "Office Supplies Ltd".to_string(),
            amount: 850.0,
            status: InvoiceStatus::Pending,
            due_date: date(2024, 4, 20),
            gl_code: "5200".to_string(),
            confidence: 93,
            ai_tags: tags(&["Office Expense", "One-time"]),
        },
        Invoice {
            id: "INV-2024-003".to_string(),
            vendor: "Marketing Agency Pro".to_string(),
            amount: 12000.0,
            status: InvoiceStatus::Approved,
            due_date: date(2024, 4, 25),
            gl_code: "6100".to_string(),
            confidence: 99,
            ai_tags: tags(&["Marketing", "Campaign"]),
        },
    ]
}

pub fn detected_anomalies() -> Vec<Anomaly> {
    vec![
        Anomaly {
            id: "AN-001".to_string(),
            kind: "Duplicate Invoice".to_string(),
            description: "Neural network detected potential duplicate payment to CloudTech Solutions".to_string(),
            severity: AnomalySeverity::High,
            confidence: 94,
            recommendation: "Review transaction history and verify with vendor".to_string(),
            action: "Hold payment pending verification".to_string(),
        },
        Anomaly {
            id: "AN-002".to_string(),
            kind: "Price Variance".to_string(),
            description: "AI detected 25% price increase from historical average for office supplies".to_string(),
            severity: AnomalySeverity::Medium,
            confidence: 87,
            recommendation: "Verify market pricing or renegotiate contract terms".to_string(),
            action: "Flag for procurement review".to_string(),
        },
    ]
}

pub fn erp_integrations() -> Vec<ErpIntegration> {
    vec![
        ErpIntegration {
            system: "SAP Business One".to_string(),
            status: ErpStatus::Connected,
            accuracy: 98.7,
            invoices_processed: 2847,
            last_sync: "2 minutes ago".to_string(),
            ai_features: "Smart GL coding, automated matching, predictive analytics".to_string(),
            automation: "Full automation enabled".to_string(),
        },
        ErpIntegration {
            system: "QuickBooks Enterprise".to_string(),
            status: ErpStatus::Syncing,
            accuracy: 96.2,
            invoices_processed: 1923,
            last_sync: "In progress".to_string(),
            ai_features: "Intelligent categorization, duplicate detection".to_string(),
            automation: "Partial automation".to_string(),
        },
    ]
}

pub fn notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: 1,
            title: "AI Compliance Audit Complete".to_string(),
            message: "Neural network analysis identified 2 medium-priority items".to_string(),
            time: "5 minutes ago".to_string(),
            kind: NotificationKind::Info,
        },
        Notification {
            id: 2,
            title: "Invoice Anomaly Detected".to_string(),
            message: "ML algorithms flagged duplicate invoice INV-003".to_string(),
            time: "1 hour ago".to_string(),
            kind: NotificationKind::Warning,
        },
        Notification {
            id: 3,
            title: "Pipeline Update".to_string(),
            message: "AI predicts TechCorp deal will close 3 days early".to_string(),
            time: "2 hours ago".to_string(),
            kind: NotificationKind::Success,
        },
    ]
}

pub fn assistant_transcript() -> Vec<ChatMessage> {
    let line = |role: ChatRole, text: &str| ChatMessage {
        role,
        text: text.to_string(),
    };

    vec![
        line(ChatRole::User, "How is revenue tracking against forecast this quarter?"),
        line(
            ChatRole::Assistant,
            "Revenue is 2.2% ahead of the predicted curve. Recurring income grew for the sixth straight month.",
        ),
        line(ChatRole::User, "Anything I should worry about?"),
        line(
            ChatRole::Assistant,
            "Internal controls are below threshold and one duplicate CloudTech invoice is on hold. I suggest generating a compliance audit.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_loads_every_panel() {
        let data = MockDataset::load();

        assert_eq!(data.kpis.len(), 6);
        assert_eq!(data.revenue.len(), data.expenses.len());
        assert_eq!(data.pipeline.len(), 5);
        assert_eq!(data.compliance.len(), 6);
        assert!(!data.macro_trends.is_empty());
        assert!(!data.assistant_transcript.is_empty());

        println!("✅ Dataset load test passed");
    }

    #[test]
    fn test_cash_flow_is_consistent() {
        let flows = cash_flow_data();

        for point in &flows {
            assert_eq!(point.net, point.inflow - point.outflow);
        }

        // Each balance is the previous balance plus this month's net
        for pair in flows.windows(2) {
            assert_eq!(pair[1].balance, pair[0].balance + pair[1].net);
        }
    }

    #[test]
    fn test_category_names_are_unique() {
        let metrics = compliance_metrics();

        for (i, a) in metrics.iter().enumerate() {
            for b in metrics.iter().skip(i + 1) {
                assert!(!a.category.contains(&b.category));
                assert!(!b.category.contains(&a.category));
            }
        }
    }

    #[test]
    fn test_deal_lookup() {
        let data = MockDataset::load();

        assert_eq!(data.deal("DEAL-003").map(|d| d.client.as_str()), Some("FinServe Partners"));
        assert!(data.deal("DEAL-999").is_none());
    }
}
