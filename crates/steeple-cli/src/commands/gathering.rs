use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use steeple_core::{
    resolve_next_occurrence, upcoming_occurrences, Config, Event, Frequency, Gathering,
};

#[derive(Subcommand)]
pub enum GatheringAction {
    /// List configured gatherings
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a gathering to the roster
    Add {
        /// Gathering name
        name: String,
        /// Weekday name, e.g. "Sunday"
        #[arg(long)]
        day: Option<String>,
        /// Frequency tag: weekly, biweekly, or monthly
        #[arg(long)]
        frequency: Option<String>,
        /// Start time, HH:MM
        #[arg(long)]
        start: Option<String>,
        /// End time, HH:MM
        #[arg(long)]
        end: Option<String>,
    },
    /// Remove a gathering by id or name
    Remove {
        /// Gathering id or name
        gathering: String,
    },
    /// Resolve the next occurrence of a gathering
    Next {
        /// Configured gathering id or name; omit to use --day ad hoc
        gathering: Option<String>,
        /// Weekday name for an ad-hoc resolution
        #[arg(long)]
        day: Option<String>,
        /// Inject "today" (YYYY-MM-DD) instead of the system date
        #[arg(long)]
        today: Option<String>,
        /// Output the resolution event as JSON
        #[arg(long)]
        json: bool,
    },
    /// List upcoming occurrence dates
    Upcoming {
        /// Configured gathering id or name; omit to use --day ad hoc
        gathering: Option<String>,
        /// Weekday name for an ad-hoc resolution
        #[arg(long)]
        day: Option<String>,
        /// Inject "today" (YYYY-MM-DD) instead of the system date
        #[arg(long)]
        today: Option<String>,
        /// Maximum number of dates to print
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },
}

pub fn run(action: GatheringAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        GatheringAction::List { json } => {
            let config = Config::load_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(&config.gatherings)?);
            } else if config.gatherings.is_empty() {
                println!("no gatherings configured");
            } else {
                for g in &config.gatherings {
                    let day = g.day_of_week.as_deref().unwrap_or("-");
                    println!("{}  {}  {} {}-{}", g.id, g.name, day, g.start_time, g.end_time);
                }
            }
        }
        GatheringAction::Add {
            name,
            day,
            frequency,
            start,
            end,
        } => {
            let mut g = Gathering::new(name);
            g.day_of_week = day;
            if let Some(tag) = frequency {
                g.frequency = parse_frequency(&tag)?;
            }
            if let Some(start) = start {
                g.start_time = start;
            }
            if let Some(end) = end {
                g.end_time = end;
            }
            let mut config = Config::load_or_default();
            let id = g.id.clone();
            config.gatherings.push(g);
            config.save()?;
            println!("gathering added: {id}");
        }
        GatheringAction::Remove { gathering } => {
            let mut config = Config::load_or_default();
            let id = config.find_gathering(&gathering)?.id.clone();
            config.gatherings.retain(|g| g.id != id);
            config.save()?;
            println!("gathering removed: {id}");
        }
        GatheringAction::Next {
            gathering,
            day,
            today,
            json,
        } => {
            let g = load_or_ad_hoc(gathering, day)?;
            let today = parse_today(today)?;
            let next = resolve_next_occurrence(&g, today);
            if json {
                let event = Event::OccurrenceResolved {
                    gathering_id: g.id.clone(),
                    date: next.date,
                    days_away: next.days_away,
                    at: Utc::now(),
                };
                println!("{}", serde_json::to_string(&event)?);
            } else {
                println!("{}: next on {} ({} days away)", g.name, next.date, next.days_away);
            }
        }
        GatheringAction::Upcoming {
            gathering,
            day,
            today,
            limit,
        } => {
            let g = load_or_ad_hoc(gathering, day)?;
            let today = parse_today(today)?;
            for date in upcoming_occurrences(&g, today, limit) {
                println!("{date}");
            }
        }
    }
    Ok(())
}

fn parse_frequency(tag: &str) -> Result<Frequency, Box<dyn std::error::Error>> {
    match tag.to_ascii_lowercase().as_str() {
        "weekly" => Ok(Frequency::Weekly),
        "biweekly" => Ok(Frequency::Biweekly),
        "monthly" => Ok(Frequency::Monthly),
        other => Err(format!("unknown frequency '{other}' (weekly, biweekly, monthly)").into()),
    }
}

fn parse_today(today: Option<String>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match today {
        Some(raw) => Ok(NaiveDate::parse_from_str(&raw, "%Y-%m-%d")?),
        None => Ok(Local::now().date_naive()),
    }
}

/// Resolve a configured gathering, or build a one-field stand-in from
/// `--day` so the resolver can be exercised without touching the roster.
fn load_or_ad_hoc(
    gathering: Option<String>,
    day: Option<String>,
) -> Result<Gathering, Box<dyn std::error::Error>> {
    match gathering {
        Some(id_or_name) => {
            let config = Config::load_or_default();
            Ok(config.find_gathering(&id_or_name)?.clone())
        }
        None => {
            let mut g = Gathering::new("ad hoc");
            g.day_of_week = day;
            Ok(g)
        }
    }
}
