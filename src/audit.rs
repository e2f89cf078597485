// 📋 Compliance Audit Report - Findings, recommendations and text rendering
//
// The report is a pure function of the compliance metrics and the
// generation time. Each category name and its score line appear exactly
// once in the rendered text: finding and recommendation templates speak
// of "this category" and the status breakdown is given as counts.

use crate::analytics::overall_compliance_score;
use crate::models::{ComplianceMetric, ComplianceStatus};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt::Write;

// ============================================================================
// FINDINGS + RECOMMENDATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FindingSeverity {
    Critical,
    Warning,
    Minor,
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Critical => "Critical",
            FindingSeverity::Warning => "Warning",
            FindingSeverity::Minor => "Minor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: FindingSeverity,
    pub description: String,
    pub impact: &'static str,
    /// Canned confidence in percent
    pub ai_confidence: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: &'static str,
    pub timeline: &'static str,
    pub owner: &'static str,
    pub ai_reasoning: &'static str,
}

pub fn findings_for(metric: &ComplianceMetric) -> Vec<Finding> {
    let mut findings = Vec::new();

    if metric.status == ComplianceStatus::NonCompliant {
        findings.push(Finding {
            severity: FindingSeverity::Critical,
            description: format!(
                "AI Analysis: compliance score of {} percent detected below regulatory threshold",
                metric.score
            ),
            impact: "Machine learning models predict high regulatory risk and potential penalties",
            ai_confidence: 97,
        });
    }

    if metric.status == ComplianceStatus::Warning {
        findings.push(Finding {
            severity: FindingSeverity::Warning,
            description: format!(
                "AI Detection: {} outstanding requirements in this category require attention",
                metric.outstanding()
            ),
            impact: "Neural network analysis indicates moderate compliance violation risk",
            ai_confidence: 89,
        });
    }

    if metric.completed < metric.requirements {
        findings.push(Finding {
            severity: FindingSeverity::Minor,
            description: format!(
                "AI Assessment: {} administrative gaps identified through pattern recognition",
                metric.outstanding()
            ),
            impact: "Intelligent algorithms flag potential process inefficiencies",
            ai_confidence: 84,
        });
    }

    findings
}

pub fn recommendations_for(metric: &ComplianceMetric) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if metric.status == ComplianceStatus::NonCompliant {
        recommendations.push(Recommendation {
            priority: Priority::High,
            action: "AI Recommendation: Immediate remediation of this category's processes based on regulatory best practices",
            timeline: "30 days",
            owner: "Compliance Team",
            ai_reasoning: "Machine learning analysis of similar cases suggests urgent intervention required",
        });
    }

    if metric.status == ComplianceStatus::Warning {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            action: "AI Suggestion: Systematic completion of the outstanding requirements in this category",
            timeline: "60 days",
            owner: "Department Manager",
            ai_reasoning: "Predictive models indicate optimal timeline for risk mitigation",
        });
    }

    recommendations.push(Recommendation {
        priority: Priority::Low,
        action: "AI Optimization: Automated monitoring system for this category",
        timeline: "90 days",
        owner: "Audit Team",
        ai_reasoning: "Neural networks recommend continuous monitoring for pattern detection",
    });

    recommendations
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for AuditPeriod {
    fn default() -> Self {
        AuditPeriod {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAudit {
    #[serde(flatten)]
    pub metric: ComplianceMetric,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSummary {
    pub total_requirements: u32,
    pub completed_requirements: u32,
    pub critical_issues: usize,
    pub warning_issues: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub period: AuditPeriod,
    pub overall_score: u32,
    pub categories: Vec<CategoryAudit>,
    pub summary: AuditSummary,
}

impl AuditReport {
    pub fn build(metrics: &[ComplianceMetric], generated_at: DateTime<Utc>) -> Self {
        let categories = metrics
            .iter()
            .map(|m| CategoryAudit {
                metric: m.clone(),
                findings: findings_for(m),
                recommendations: recommendations_for(m),
            })
            .collect();

        AuditReport {
            report_id: format!("AI-AUDIT-{}", generated_at.timestamp_millis()),
            generated_at,
            period: AuditPeriod::default(),
            overall_score: overall_compliance_score(metrics),
            categories,
            summary: AuditSummary {
                total_requirements: metrics.iter().map(|m| m.requirements).sum(),
                completed_requirements: metrics.iter().map(|m| m.completed).sum(),
                critical_issues: metrics
                    .iter()
                    .filter(|m| m.status == ComplianceStatus::NonCompliant)
                    .count(),
                warning_issues: metrics
                    .iter()
                    .filter(|m| m.status == ComplianceStatus::Warning)
                    .count(),
            },
        }
    }

    pub fn file_name(&self) -> String {
        format!("AI_Compliance_Audit_Report_{}.txt", self.report_id)
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.recommendations.iter())
            .filter(|r| r.priority == priority)
            .count()
    }

    fn status_count(&self, status: ComplianceStatus) -> usize {
        self.categories.iter().filter(|c| c.metric.status == status).count()
    }

    pub fn follow_up_date(&self) -> NaiveDate {
        (self.generated_at + Duration::days(90)).date_naive()
    }

    /// Render the downloadable plain-text report
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = self.write_report(&mut out);
        out
    }

    fn write_report(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "AI-POWERED COMPLIANCE AUDIT REPORT")?;
        writeln!(out, "==================================")?;
        writeln!(out, "🤖 Generated by Artificial Intelligence Systems")?;
        writeln!(out)?;
        writeln!(out, "Report ID: {}", self.report_id)?;
        writeln!(out, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out, "Period: {} to {}", self.period.start_date, self.period.end_date)?;
        writeln!(out, "AI Analysis Engine: FinancePro Neural Compliance Network v2.1")?;
        writeln!(out)?;

        writeln!(out, "EXECUTIVE SUMMARY (AI GENERATED)")?;
        writeln!(out, "===============================")?;
        writeln!(out, "Overall Compliance Rating: {} percent (AI Confidence: 94%)", self.overall_score)?;
        writeln!(out, "Total Requirements: {}", self.summary.total_requirements)?;
        writeln!(out, "Completed Requirements: {}", self.summary.completed_requirements)?;
        writeln!(out, "Critical Issues: {} (AI Risk Assessment: High)", self.summary.critical_issues)?;
        writeln!(out, "Warning Issues: {} (AI Risk Assessment: Medium)", self.summary.warning_issues)?;
        writeln!(out)?;

        writeln!(out, "AI METHODOLOGY")?;
        writeln!(out, "==============")?;
        writeln!(out, "This report was generated using advanced artificial intelligence algorithms including:")?;
        for technique in [
            "Machine Learning Pattern Recognition",
            "Neural Network Risk Assessment",
            "Predictive Compliance Modeling",
            "Automated Regulatory Analysis",
            "Intelligent Anomaly Detection",
        ] {
            writeln!(out, "• {}", technique)?;
        }
        writeln!(out)?;

        writeln!(out, "DETAILED AI FINDINGS")?;
        writeln!(out, "===================")?;
        for category in &self.categories {
            self.write_category(out, category)?;
        }

        writeln!(out, "AI COMPLIANCE STATUS BREAKDOWN")?;
        writeln!(out, "==============================")?;
        writeln!(out, "Compliant:     {}", self.status_count(ComplianceStatus::Compliant))?;
        writeln!(out, "Warning:       {}", self.status_count(ComplianceStatus::Warning))?;
        writeln!(out, "Non-compliant: {}", self.status_count(ComplianceStatus::NonCompliant))?;
        writeln!(out)?;

        writeln!(out, "AI-GENERATED RECOMMENDATIONS SUMMARY")?;
        writeln!(out, "====================================")?;
        writeln!(out, "High Priority Actions: {} (AI Flagged as Urgent)", self.priority_count(Priority::High))?;
        writeln!(out, "Medium Priority Actions: {} (AI Recommended)", self.priority_count(Priority::Medium))?;
        writeln!(out, "Low Priority Actions: {} (AI Optimizations)", self.priority_count(Priority::Low))?;
        writeln!(out)?;

        writeln!(out, "AI-POWERED NEXT STEPS")?;
        writeln!(out, "=====================")?;
        writeln!(out, "1. 🎯 Address AI-identified critical compliance issues within 30 days")?;
        writeln!(out, "2. 🔧 Implement AI-recommended process improvements")?;
        writeln!(out, "3. 📅 Schedule AI-assisted follow-up audit for {}", self.follow_up_date())?;
        writeln!(out, "4. 🤖 Deploy continuous AI monitoring for real-time compliance tracking")?;
        writeln!(out)?;

        writeln!(out, "ABOUT THIS AI ANALYSIS")?;
        writeln!(out, "======================")?;
        writeln!(
            out,
            "The AI system analyzed {} compliance requirements across {} categories in milliseconds.",
            self.summary.total_requirements,
            self.categories.len()
        )?;
        writeln!(out)?;
        writeln!(out, "🤖 Report generated by FinancePro AI Compliance Engine")?;
        writeln!(out, "🧠 Powered by Neural Network Technology")?;
        writeln!(
            out,
            "© {} AI-Driven Professional Financial Management System",
            self.generated_at.year()
        )?;

        Ok(())
    }

    fn write_category(&self, out: &mut String, category: &CategoryAudit) -> std::fmt::Result {
        let metric = &category.metric;
        let heading = format!("{} - AI ANALYSIS", metric.category);

        writeln!(out)?;
        writeln!(out, "{}", heading)?;
        writeln!(out, "{}", "=".repeat(heading.chars().count()))?;
        writeln!(out, "Status: {} (AI Verified)", metric.status.as_str())?;
        writeln!(out, "Score: {}% (Machine Learning Assessment)", metric.score)?;
        writeln!(out, "Requirements: {}/{} completed", metric.completed, metric.requirements)?;
        writeln!(out, "Next Review: {}", metric.next_review)?;
        writeln!(out)?;

        writeln!(out, "🤖 AI-Generated Findings:")?;
        if category.findings.is_empty() {
            writeln!(out, "  • No findings")?;
        }
        for finding in &category.findings {
            writeln!(out, "  • [{}] {}", finding.severity.as_str(), finding.description)?;
            writeln!(out, "    💡 AI Impact Analysis: {}", finding.impact)?;
            writeln!(out, "    🎯 AI Confidence Level: {}%", finding.ai_confidence)?;
        }
        writeln!(out)?;

        writeln!(out, "🧠 AI-Powered Recommendations:")?;
        for rec in &category.recommendations {
            writeln!(out, "  • [{}] {}", rec.priority.as_str(), rec.action)?;
            writeln!(out, "    ⏱️ Timeline: {} | 👤 Owner: {}", rec.timeline, rec.owner)?;
            writeln!(out, "    🔍 AI Reasoning: {}", rec.ai_reasoning)?;
        }
        writeln!(out)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::compliance_metrics;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap()
    }

    fn metric(category: &str, status: ComplianceStatus, score: u32, requirements: u32, completed: u32) -> ComplianceMetric {
        ComplianceMetric {
            category: category.to_string(),
            status,
            score,
            requirements,
            completed,
            next_review: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_findings_per_status() {
        let critical = metric("SOX", ComplianceStatus::NonCompliant, 65, 22, 14);
        let findings = findings_for(&critical);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, FindingSeverity::Critical);
        assert_eq!(findings[1].severity, FindingSeverity::Minor);
        assert!(findings[1].description.contains("8 administrative gaps"));

        let warning = metric("GDPR", ComplianceStatus::Warning, 82, 18, 15);
        let findings = findings_for(&warning);
        assert_eq!(findings[0].severity, FindingSeverity::Warning);
        assert!(findings[0].description.contains("3 outstanding"));

        let clean = metric("FR", ComplianceStatus::Compliant, 95, 24, 24);
        assert!(findings_for(&clean).is_empty());

        println!("✅ Findings test passed");
    }

    #[test]
    fn test_every_category_gets_a_low_priority_recommendation() {
        let report = AuditReport::build(&compliance_metrics(), generated_at());

        for category in &report.categories {
            assert_eq!(category.recommendations.last().map(|r| r.priority), Some(Priority::Low));
        }

        assert_eq!(report.priority_count(Priority::High), 1);
        assert_eq!(report.priority_count(Priority::Medium), 2);
        assert_eq!(report.priority_count(Priority::Low), 6);
    }

    #[test]
    fn test_report_summary_from_fixtures() {
        let report = AuditReport::build(&compliance_metrics(), generated_at());

        assert_eq!(report.overall_score, 83);
        assert_eq!(report.summary.total_requirements, 112);
        assert_eq!(report.summary.completed_requirements, 96);
        assert_eq!(report.summary.critical_issues, 1);
        assert_eq!(report.summary.warning_issues, 2);
        assert_eq!(report.report_id, format!("AI-AUDIT-{}", generated_at().timestamp_millis()));
        assert!(report.file_name().starts_with("AI_Compliance_Audit_Report_AI-AUDIT-"));
        assert_eq!(report.follow_up_date(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_rendered_report_names_each_category_and_score_once() {
        let metrics = compliance_metrics();
        let text = AuditReport::build(&metrics, generated_at()).render();

        for m in &metrics {
            assert_eq!(text.matches(m.category.as_str()).count(), 1, "category {}", m.category);
            assert_eq!(text.matches(&format!("Score: {}%", m.score)).count(), 1, "score {}", m.score);
        }

        println!("✅ Report rendering test passed ({} bytes)", text.len());
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let metrics = compliance_metrics();
        let a = AuditReport::build(&metrics, generated_at()).render();
        let b = AuditReport::build(&metrics, generated_at()).render();
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_line_unique_when_overall_matches_a_category() {
        // overall = round(78.33) = 78, same as the second category
        let metrics = vec![
            metric("Alpha", ComplianceStatus::Compliant, 92, 10, 10),
            metric("Beta", ComplianceStatus::Warning, 78, 10, 8),
            metric("Gamma", ComplianceStatus::NonCompliant, 65, 10, 5),
        ];
        let report = AuditReport::build(&metrics, generated_at());
        assert_eq!(report.overall_score, 78);

        let text = report.render();
        assert_eq!(text.matches("Score: 78%").count(), 1);
        assert!(text.contains("Overall Compliance Rating: 78 percent"));
    }
}
