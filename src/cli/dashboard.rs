use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use super::{client, runtime};
use crate::api::ApiClient;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::settings::{load_settings, store_token};
use crate::state::{Effect, Outcome};
use crate::tui;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run one effect on the runtime and report its outcome back to the UI loop.
fn spawn_effect(
    rt: &tokio::runtime::Runtime,
    api: &ApiClient,
    effect: Effect,
    tx: &UnboundedSender<Outcome>,
) {
    let api = api.clone();
    let tx = tx.clone();
    rt.spawn(async move {
        let outcome = match effect {
            Effect::Fetch(ticket) => Outcome::Fetched {
                seq: ticket.seq,
                result: api.fetch_transactions(&ticket.query).await,
            },
            Effect::Submit { id: Some(id), input } => {
                Outcome::Submitted(api.update_transaction(&id, &input).await)
            }
            Effect::Submit { id: None, input } => {
                Outcome::Submitted(api.add_transaction(&input).await)
            }
            Effect::Delete { id } => Outcome::Deleted(api.delete_transaction(&id).await),
            Effect::GenerateReport => Outcome::ReportReady(api.generate_report().await),
            Effect::LoadUser => Outcome::UserLoaded(api.me().await),
            Effect::Logout => {
                if let Err(e) = api.logout().await {
                    tracing::warn!("logout request failed: {e}");
                }
                if let Err(e) = store_token(None) {
                    tracing::error!("failed to clear stored token: {e}");
                }
                Outcome::LoggedOut
            }
        };
        // The receiver is gone only when the UI has already exited.
        let _ = tx.send(outcome);
    });
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let api = client()?;
    let rt = runtime()?;
    let (tx, mut rx) = unbounded_channel();

    let mut dashboard = Dashboard::new(settings.currency_symbol.clone());
    for effect in dashboard.app.start() {
        spawn_effect(&rt, &api, effect, &tx);
    }

    let mut terminal = tui::init_terminal();
    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| dashboard.draw_frame(frame)) {
            break Err(e.into());
        }

        while let Ok(outcome) = rx.try_recv() {
            for effect in dashboard.app.handle(outcome) {
                spawn_effect(&rt, &api, effect, &tx);
            }
        }
        if dashboard.app.quit || dashboard.app.sign_in_required {
            break Ok(());
        }

        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => break Err(e.into()),
        }
        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break Ok(());
                }
                let today = Local::now().date_naive();
                for effect in dashboard.handle_key_event(key.code, today) {
                    spawn_effect(&rt, &api, effect, &tx);
                }
            }
            Ok(_) => {}
        }
    };
    tui::restore_terminal();

    // Requests still in flight are abandoned with the runtime.
    rt.shutdown_timeout(Duration::from_millis(200));

    if dashboard.app.sign_in_required {
        println!("You are not signed in. Run `frugalflow login --email <EMAIL>` or `frugalflow google`.");
    }
    result
}
