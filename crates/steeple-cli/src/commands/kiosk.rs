use chrono::{Local, NaiveTime, Utc};
use clap::Subcommand;
use steeple_core::{Config, Event, KioskWindow, ModeController};

#[derive(Subcommand)]
pub enum KioskAction {
    /// Compute the kiosk mode for a gathering's hours
    Mode {
        /// Configured gathering id or name; omit to use --start/--end
        gathering: Option<String>,
        /// Start time, HH:MM (ad hoc)
        #[arg(long)]
        start: Option<String>,
        /// End time, HH:MM (ad hoc)
        #[arg(long)]
        end: Option<String>,
        /// Inject "now" (HH:MM) instead of the system clock
        #[arg(long)]
        now: Option<String>,
    },
    /// Host a kiosk session, re-evaluating the mode on a fixed ticker
    Run {
        /// Configured gathering id or name; omit to use --start/--end
        gathering: Option<String>,
        /// Start time, HH:MM (ad hoc)
        #[arg(long)]
        start: Option<String>,
        /// End time, HH:MM (ad hoc)
        #[arg(long)]
        end: Option<String>,
        /// Seconds between ticks
        #[arg(long, default_value_t = 900)]
        interval_secs: u64,
    },
}

pub fn run(action: KioskAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let lead_minutes = config.kiosk.checkout_lead();
    match action {
        KioskAction::Mode {
            gathering,
            start,
            end,
            now,
        } => {
            let window = resolve_window(&config, gathering, start, end)?;
            let now = match now {
                Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")?,
                None => Local::now().time(),
            };
            println!("{}", window.mode_at_with(now, lead_minutes));
        }
        KioskAction::Run {
            gathering,
            start,
            end,
            interval_secs,
        } => {
            let window = resolve_window(&config, gathering, start, end)?;
            let controller =
                ModeController::with_lead(window, lead_minutes, Local::now().naive_local());
            println!("kiosk session started in {} mode", controller.mode());
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(host_session(controller, interval_secs))?;
        }
    }
    Ok(())
}

/// One ticker per session; dropping out of the loop on ctrl-c releases it.
async fn host_session(
    mut controller: ModeController,
    interval_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    ticker.tick().await; // The first tick fires immediately; skip it.
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = controller.tick(Local::now().naive_local()) {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let event = Event::KioskSessionEnded { at: Utc::now() };
                println!("{}", serde_json::to_string(&event)?);
                break;
            }
        }
    }
    Ok(())
}

fn resolve_window(
    config: &Config,
    gathering: Option<String>,
    start: Option<String>,
    end: Option<String>,
) -> Result<KioskWindow, Box<dyn std::error::Error>> {
    match gathering {
        Some(id_or_name) => {
            let g = config.find_gathering(&id_or_name)?;
            Ok(KioskWindow::for_gathering(g)?)
        }
        None => {
            let start = start.ok_or("either a gathering or --start/--end is required")?;
            let end = end.ok_or("either a gathering or --start/--end is required")?;
            Ok(KioskWindow::parse(&start, &end)?)
        }
    }
}
