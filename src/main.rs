// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;
use std::thread;
use std::time::Instant;

use financepro::{
    logging, AuditGenerator, DashboardConfig, Delivery, DirectorySink, GeneratorEvent,
    MockDataset, SystemClock, APP_NAME, VERSION,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = DashboardConfig::from_env()?;

    if args.len() > 1 && args[1] == "report" {
        // Headless report mode
        logging::init_stdout("info")?;
        run_report(&config)?;
    } else {
        // UI mode (default)
        run_ui_mode(&config)?;
    }

    Ok(())
}

fn build_generator(config: &DashboardConfig, data: &MockDataset) -> AuditGenerator {
    AuditGenerator::new(
        data.compliance.clone(),
        config.stage_delay,
        Box::new(SystemClock),
        Box::new(DirectorySink::new(config.export_dir.clone())),
    )
}

fn run_report(config: &DashboardConfig) -> Result<()> {
    println!("🧠 {} v{} - AI Compliance Audit", APP_NAME, VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let data = MockDataset::load();
    let mut generator = build_generator(config, &data);

    let mut events = generator.start()?;
    loop {
        for event in events.drain(..) {
            match event {
                GeneratorEvent::StageChanged { index, label } => {
                    println!("  [{}/{}] {}", index + 1, generator.stages().len(), label);
                }
                GeneratorEvent::Completed { report_id, delivery } => {
                    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                    println!("✅ Report {} generated", report_id);
                    match delivery {
                        Delivery::Saved(path) => println!("💾 Saved to {}", path.display()),
                        Delivery::Skipped { reason } => println!("⚠️  Download skipped: {}", reason),
                    }
                    return Ok(());
                }
                GeneratorEvent::GeneratedCleared => {}
            }
        }

        // Sleep exactly until the next stage boundary
        if let Some(deadline) = generator.next_deadline() {
            thread::sleep(deadline.saturating_duration_since(Instant::now()));
        }
        events = generator.tick();
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &DashboardConfig) -> Result<()> {
    use financepro::DashboardState;

    // Logging is optional; the dashboard still runs without it
    if let Err(e) = logging::init_file(&config.export_dir, "info") {
        eprintln!("⚠️  File logging disabled: {:#}", e);
    }

    println!("🖥️  Loading {} dashboard...\n", APP_NAME);

    let data = MockDataset::load();
    let generator = build_generator(config, &data);
    let state = DashboardState::new(data, config.theme, generator);

    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(state, config.tick);
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &DashboardConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or run headless: cargo run -- report");
    eprintln!("   Or serve the API: cargo run --bin financepro-server --features server");
    std::process::exit(1);
}
