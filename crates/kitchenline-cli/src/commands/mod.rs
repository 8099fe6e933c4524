pub mod config;
pub mod drag;
pub mod event;
pub mod timeline;

use std::error::Error;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use clap::Args;
use kitchenline_core::{CalendarZone, Clock, Config, DebugClock, JsonFileStore};
use tracing::debug;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct Globals {
    /// Event file (defaults to events.json in the data directory)
    #[arg(long, global = true)]
    pub events: Option<PathBuf>,
    /// Pretend the current time is this ("2026-03-14 09:30" local, or RFC 3339)
    #[arg(long, global = true)]
    pub now: Option<String>,
}

/// Loaded config, calendar zone and event store for one invocation.
pub struct Context {
    pub config: Config,
    pub zone: CalendarZone,
    pub clock: DebugClock,
    pub store: JsonFileStore,
}

impl Context {
    pub fn open(globals: &Globals) -> Result<Self, Box<dyn Error>> {
        let config = Config::load()?;
        let zone = config.zone().ok_or("timeline.timezone_offset_minutes is out of range")?;
        let now = globals.now.as_deref().map(|s| parse_time(s, zone)).transpose()?;
        let path = match &globals.events {
            Some(path) => path.clone(),
            None => JsonFileStore::default_path()?,
        };
        let store = JsonFileStore::open(path, zone)?;
        Ok(Self {
            config,
            zone,
            clock: DebugClock::new(now),
            store,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Write the event file back if anything changed.
    pub fn save(&mut self) -> Result<(), Box<dyn Error>> {
        if self.store.is_dirty() {
            self.store.save()?;
            debug!(path = %self.store.path().display(), "events saved");
        }
        Ok(())
    }

    pub fn format_time(&self, time: DateTime<Utc>) -> String {
        self.zone.local(time).format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Parse RFC 3339, or `YYYY-MM-DD HH:MM` as local time in `zone`.
pub fn parse_time(input: &str, zone: CalendarZone) -> Result<DateTime<Utc>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(input) {
        return Ok(t.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .map_err(|_| format!("cannot parse time '{input}', expected \"YYYY-MM-DD HH:MM\""))?;
    Ok(naive.and_utc() - Duration::minutes(i64::from(zone.offset_minutes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_local_and_rfc3339() {
        let zone = CalendarZone::from_offset_minutes(60).unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 3, 14, 8, 30, 0).unwrap();
        assert_eq!(parse_time("2026-03-14 09:30", zone).unwrap(), expected);
        assert_eq!(parse_time("2026-03-14T09:30", zone).unwrap(), expected);
        assert_eq!(parse_time("2026-03-14T08:30:00Z", zone).unwrap(), expected);
        assert!(parse_time("half past nine", zone).is_err());
    }
}
