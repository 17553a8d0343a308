use anyhow::{Context, Result};
use dashgrid::app::action::Action;
use dashgrid::app::event::AppEvent;
use dashgrid::app::handler;
use dashgrid::app::render;
use dashgrid::app::state::AppState;
use dashgrid::config::{self, expand_home};
use dashgrid::dashboard::{
    DashboardController, DashboardDocument, MonitorSet, TracingMonitor, WidgetStore,
};
use dashgrid::logging::{self, AuditLog};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let first_run = !config::config_path().exists();
    let cfg = config::load_config()?;
    logging::init_tracing(&cfg.logging);

    // Keep the generated dashboard name stable across runs
    if first_run {
        if let Err(e) = config::save_config(&cfg) {
            warn!(error = %e, "could not write default config");
        }
    }

    let result = run_app(cfg).await;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(cfg: config::AppConfig) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let monitors = MonitorSet::new()
        .with(TracingMonitor)
        .with(AuditLog::new(&cfg.logging, &cfg.dashboard_name));
    let store = WidgetStore::new(cfg.grid.clone(), cfg.history.clone());
    let mut state = AppState::new(cfg.clone(), DashboardController::with_monitor(store, monitors));

    // Restore the last saved dashboard, if any
    let document_path = expand_home(&cfg.persistence.document_path);
    if cfg.persistence.load_on_start && document_path.exists() {
        match DashboardDocument::load_json_file(&document_path) {
            Ok(doc) => {
                state.system_message(format!("Loaded {}", document_path.display()));
                state.controller.load_document(doc);
            }
            Err(e) => {
                warn!(error = %e, "could not load saved dashboard");
                state.error_message(format!("Could not load saved dashboard: {}", e));
            }
        }
    }

    // Spawn input task
    let input_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if input_tx.send(AppEvent::Input(line)).is_err() {
                        break;
                    }
                }
                Ok(None) | Err(_) => {
                    let _ = input_tx.send(AppEvent::InputClosed);
                    break;
                }
            }
        }
    });

    // Deferred demo seeding; may land before or after the first user edit
    if cfg.demo.enabled {
        let demo_tx = event_tx.clone();
        let delay = std::time::Duration::from_millis(cfg.demo.init_delay_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = demo_tx.send(AppEvent::DemoDataReady);
        });
    }
    drop(event_tx);

    state.system_message(format!("dashgrid: {} (/help for commands)", cfg.dashboard_name));
    flush_output(&mut state);

    // Main event loop
    while let Some(event) = event_rx.recv().await {
        let actions = handler::handle_event(&mut state, event);

        for action in actions {
            match action {
                Action::SaveDocument => {
                    let doc = state.controller.document(&state.config.dashboard_name);
                    match doc
                        .save_json_file(&document_path)
                        .with_context(|| format!("saving {}", document_path.display()))
                    {
                        Ok(()) => {
                            info!(path = %document_path.display(), "dashboard saved");
                            state.system_message(format!("Saved to {}", document_path.display()));
                        }
                        Err(e) => state.error_message(format!("{:#}", e)),
                    }
                }
                Action::Quit => state.should_quit = true,
            }
        }

        flush_output(&mut state);

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Print pending messages, then the dashboard if it changed.
fn flush_output(state: &mut AppState) {
    for msg in state.new_messages.drain(..) {
        println!("{}", render::format_message(&msg));
    }
    if state.take_dirty() {
        for line in render::render_frame(state) {
            println!("{}", line);
        }
    }
}
