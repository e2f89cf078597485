// 🧠 Staged Audit Generator - Fake "AI" progress, then a real report
//
// Drives the five progress stages, builds the audit report when the last
// stage elapses, hands it to the sink, and keeps the "generated" banner up
// for five seconds. Dropping the generator (the compliance view going
// away) cancels anything still pending.

use crate::audit::AuditReport;
use crate::error::AuditError;
use crate::export::{deliver_or_skip, Delivery, ReportSink};
use crate::models::ComplianceMetric;
use crate::sequencer::{CancelToken, Clock, DelayPolicy, SequencerEvent, Stage, StagedSequencer};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long the "generated" banner stays visible
pub const GENERATED_DISPLAY: Duration = Duration::from_secs(5);

pub fn audit_stages() -> Vec<Stage> {
    vec![
        Stage::new("AI scanning compliance data repositories...", 800),
        Stage::new("Neural networks analyzing regulatory patterns...", 700),
        Stage::new("Machine learning identifying risk vectors...", 600),
        Stage::new("AI algorithms generating compliance insights...", 500),
        Stage::new("Intelligent system compiling audit report...", 400),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorEvent {
    StageChanged { index: usize, label: String },
    Completed { report_id: String, delivery: Delivery },
    GeneratedCleared,
}

pub struct AuditGenerator {
    clock: Box<dyn Clock>,
    sink: Box<dyn ReportSink>,
    sequencer: StagedSequencer,
    metrics: Vec<ComplianceMetric>,
    generated_until: Option<Instant>,
    last_delivery: Option<Delivery>,
    run_token: CancelToken,
}

impl AuditGenerator {
    pub fn new(
        metrics: Vec<ComplianceMetric>,
        policy: DelayPolicy,
        clock: Box<dyn Clock>,
        sink: Box<dyn ReportSink>,
    ) -> Self {
        AuditGenerator {
            clock,
            sink,
            sequencer: StagedSequencer::new(audit_stages(), policy),
            metrics,
            generated_until: None,
            last_delivery: None,
            run_token: CancelToken::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.sequencer.is_running()
    }

    /// Label of the stage currently on screen
    pub fn current_stage(&self) -> Option<&str> {
        self.sequencer.current_stage().map(|s| s.label.as_str())
    }

    pub fn stages(&self) -> &[Stage] {
        self.sequencer.stages()
    }

    pub fn is_generated(&self) -> bool {
        self.generated_until.is_some()
    }

    pub fn last_delivery(&self) -> Option<&Delivery> {
        self.last_delivery.as_ref()
    }

    /// Instant of the next pending transition (stage, completion or banner clear)
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sequencer.next_deadline().or(self.generated_until)
    }

    /// Token for the run in progress; cancelling it abandons the run
    pub fn cancel_token(&self) -> CancelToken {
        self.run_token.clone()
    }

    /// Begin a run. Returns the events emitted immediately (the first stage).
    pub fn start(&mut self) -> Result<Vec<GeneratorEvent>, AuditError> {
        if self.is_busy() {
            return Err(AuditError::AlreadyRunning);
        }

        let now = self.clock.now();
        let events = self.sequencer.start(now)?;
        self.run_token = self.sequencer.token();
        self.generated_until = None;
        info!(stages = self.sequencer.stages().len(), "audit generation started");

        Ok(self.apply(events, now))
    }

    /// Advance to the clock's current time and report what changed
    pub fn tick(&mut self) -> Vec<GeneratorEvent> {
        if self.run_token.is_cancelled() {
            self.abandon();
            return Vec::new();
        }

        let now = self.clock.now();
        let events = self.sequencer.poll(now);
        let mut out = self.apply(events, now);

        if let Some(until) = self.generated_until {
            if now >= until {
                self.generated_until = None;
                out.push(GeneratorEvent::GeneratedCleared);
            }
        }

        out
    }

    pub fn cancel(&mut self) {
        if self.is_busy() || self.generated_until.is_some() {
            info!("audit generation cancelled");
        }
        self.run_token.cancel();
        self.abandon();
    }

    fn abandon(&mut self) {
        self.sequencer.cancel();
        self.generated_until = None;
    }

    fn apply(&mut self, events: Vec<SequencerEvent>, now: Instant) -> Vec<GeneratorEvent> {
        let mut out = Vec::with_capacity(events.len());

        for event in events {
            match event {
                SequencerEvent::StageEntered { index, label } => {
                    debug!(index, stage = %label, "audit stage");
                    out.push(GeneratorEvent::StageChanged { index, label });
                }
                SequencerEvent::Finished => out.push(self.complete(now)),
            }
        }

        out
    }

    fn complete(&mut self, now: Instant) -> GeneratorEvent {
        let report = AuditReport::build(&self.metrics, self.clock.wall_time());
        let delivery = deliver_or_skip(self.sink.as_ref(), &report.file_name(), &report.render());

        info!(
            report_id = %report.report_id,
            overall_score = report.overall_score,
            saved = delivery.is_saved(),
            "audit report generated"
        );

        self.generated_until = Some(now + GENERATED_DISPLAY);
        self.last_delivery = Some(delivery.clone());

        GeneratorEvent::Completed {
            report_id: report.report_id,
            delivery,
        }
    }
}

impl Drop for AuditGenerator {
    fn drop(&mut self) {
        self.run_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::compliance_metrics;
    use crate::error::ExportError;
    use crate::export::DisabledSink;
    use crate::sequencer::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Records deliveries instead of writing files
    #[derive(Clone, Default)]
    struct RecordingSink {
        files: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ReportSink for RecordingSink {
        fn deliver(&self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
            self.files
                .lock()
                .unwrap()
                .push((file_name.to_string(), contents.to_string()));
            Ok(PathBuf::from(file_name))
        }
    }

    fn setup() -> (AuditGenerator, ManualClock, RecordingSink) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap());
        let sink = RecordingSink::default();
        let generator = AuditGenerator::new(
            compliance_metrics(),
            DelayPolicy::Fixed,
            Box::new(clock.clone()),
            Box::new(sink.clone()),
        );
        (generator, clock, sink)
    }

    fn run_until_idle(generator: &mut AuditGenerator, clock: &ManualClock, step_ms: u64) -> Vec<GeneratorEvent> {
        let mut events = Vec::new();
        for _ in 0..200 {
            clock.advance(Duration::from_millis(step_ms));
            events.extend(generator.tick());
            if !generator.is_busy() && !generator.is_generated() {
                break;
            }
        }
        events
    }

    #[test]
    fn test_full_run_walks_all_stages_then_delivers() {
        let (mut generator, clock, sink) = setup();

        let mut events = generator.start().unwrap();
        events.extend(run_until_idle(&mut generator, &clock, 100));

        let labels: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                GeneratorEvent::StageChanged { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect();
        let expected: Vec<String> = audit_stages().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, expected);

        // Completion comes after the last stage and exactly once
        let completed_at = events
            .iter()
            .position(|e| matches!(e, GeneratorEvent::Completed { .. }))
            .unwrap();
        assert_eq!(completed_at, 5);
        assert_eq!(events.iter().filter(|e| matches!(e, GeneratorEvent::Completed { .. })).count(), 1);
        assert_eq!(events.last(), Some(&GeneratorEvent::GeneratedCleared));

        let files = sink.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.starts_with("AI_Compliance_Audit_Report_AI-AUDIT-"));
        assert!(files[0].1.contains("Internal Controls (SOX)"));

        println!("✅ Full generator run test passed");
    }

    #[test]
    fn test_current_stage_tracks_progress() {
        let (mut generator, clock, _sink) = setup();

        generator.start().unwrap();
        assert_eq!(generator.current_stage(), Some("AI scanning compliance data repositories..."));

        clock.advance(Duration::from_millis(800));
        generator.tick();
        assert_eq!(generator.current_stage(), Some("Neural networks analyzing regulatory patterns..."));

        // 700 + 600 + 500 + 400 more to finish
        clock.advance(Duration::from_millis(2200));
        generator.tick();
        assert_eq!(generator.current_stage(), None);
        assert!(!generator.is_busy());
        assert!(generator.is_generated());
    }

    #[test]
    fn test_generated_flag_clears_after_five_seconds() {
        let (mut generator, clock, _sink) = setup();

        generator.start().unwrap();
        clock.advance(Duration::from_millis(3000));
        generator.tick();
        assert!(generator.is_generated());

        clock.advance(Duration::from_millis(4999));
        assert!(generator.tick().is_empty());
        assert!(generator.is_generated());

        clock.advance(Duration::from_millis(1));
        assert_eq!(generator.tick(), vec![GeneratorEvent::GeneratedCleared]);
        assert!(!generator.is_generated());
    }

    #[test]
    fn test_double_start_is_rejected() {
        let (mut generator, clock, sink) = setup();

        generator.start().unwrap();
        clock.advance(Duration::from_millis(100));
        assert_eq!(generator.start(), Err(AuditError::AlreadyRunning));

        run_until_idle(&mut generator, &clock, 100);
        assert_eq!(sink.files.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_cancelled_run_never_delivers() {
        let (mut generator, clock, sink) = setup();

        generator.start().unwrap();
        clock.advance(Duration::from_millis(900));
        generator.tick();

        let token = generator.cancel_token();
        token.cancel();

        clock.advance(Duration::from_secs(10));
        assert!(generator.tick().is_empty());
        assert!(!generator.is_busy());
        assert!(generator.current_stage().is_none());
        assert!(sink.files.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_clears_pending_banner() {
        let (mut generator, clock, _sink) = setup();

        generator.start().unwrap();
        clock.advance(Duration::from_millis(3000));
        generator.tick();
        assert!(generator.is_generated());

        generator.cancel();
        assert!(!generator.is_generated());
        clock.advance(Duration::from_secs(10));
        assert!(generator.tick().is_empty());
    }

    #[test]
    fn test_restart_after_completion() {
        let (mut generator, clock, sink) = setup();

        generator.start().unwrap();
        clock.advance(Duration::from_millis(3000));
        generator.tick();

        // Banner still showing, but the run itself is over
        assert!(generator.start().is_ok());
        assert!(!generator.is_generated());
        run_until_idle(&mut generator, &clock, 500);
        assert_eq!(sink.files.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unavailable_download_still_completes() {
        let clock = ManualClock::new(Utc::now());
        let mut generator = AuditGenerator::new(
            compliance_metrics(),
            DelayPolicy::Fixed,
            Box::new(clock.clone()),
            Box::new(DisabledSink),
        );

        generator.start().unwrap();
        clock.advance(Duration::from_secs(3));
        let events = generator.tick();

        assert!(events.iter().any(|e| matches!(
            e,
            GeneratorEvent::Completed { delivery: Delivery::Skipped { .. }, .. }
        )));
        assert!(generator.is_generated());
        assert!(matches!(generator.last_delivery(), Some(Delivery::Skipped { .. })));
    }

    #[test]
    fn test_drop_cancels_run() {
        let (mut generator, _clock, _sink) = setup();
        generator.start().unwrap();
        let token = generator.cancel_token();

        drop(generator);
        assert!(token.is_cancelled());
    }
}
