use chrono::Duration;
use clap::Subcommand;
use kitchenline_core::schedule::{add_event_at, toggle_confirm, toggle_pinned, undo_done};
use kitchenline_core::{EventId, EventKind, EventMutation, EventSource, KitchenEvent, PersonId};

use super::{parse_time, Context, Globals};

#[derive(Subcommand)]
pub enum EventAction {
    /// List all events with their live status
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an event
    Add {
        /// Title
        title: String,
        /// Start time ("YYYY-MM-DD HH:MM" local, or RFC 3339)
        #[arg(long)]
        at: String,
        /// cooking, eating, defrost, grocery or dishwasher
        #[arg(long, default_value = "cooking")]
        kind: EventKind,
        /// Duration in minutes (omit for a point-in-time event)
        #[arg(long)]
        minutes: Option<i64>,
        /// Participant (repeatable)
        #[arg(long = "person")]
        people: Vec<String>,
    },
    /// Delete an event
    Remove { id: String },
    /// Toggle the pinned flag
    Pin { id: String },
    /// Toggle confirmation (confirming a started event marks it done)
    Confirm { id: String },
    /// Mark an event done
    Done { id: String },
    /// Undo completion
    Undo { id: String },
}

pub fn run(action: EventAction, globals: &Globals) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::open(globals)?;
    match action {
        EventAction::List { json } => {
            let events = ctx.store.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&*events)?);
            } else if events.is_empty() {
                println!("no events");
            } else {
                let engine = ctx.config.status_engine();
                let now = ctx.now();
                for event in events.iter() {
                    println!("{}", describe(&ctx, event, engine.status(event, now).as_str()));
                }
            }
        }
        EventAction::Add {
            title,
            at,
            kind,
            minutes,
            people,
        } => {
            let start = parse_time(&at, ctx.zone)?;
            let id = add_event_at(&mut ctx.store, start, kind, title, minutes.map(Duration::minutes), ctx.zone)?;
            if !people.is_empty() {
                if let Some(mut event) = ctx.store.remove(&id) {
                    event.participants.extend(people.into_iter().map(PersonId::from));
                    ctx.store.insert(event)?;
                }
            }
            ctx.save()?;
            println!("{id}");
        }
        EventAction::Remove { id } => {
            let id = EventId::from(id);
            ctx.store.remove(&id).ok_or_else(|| not_found(&id))?;
            ctx.save()?;
            println!("removed {id}");
        }
        EventAction::Pin { id } => {
            let id = EventId::from(id);
            let pinned = toggle_pinned(&mut ctx.store, &id).ok_or_else(|| not_found(&id))?;
            ctx.save()?;
            println!("{id} {}", if pinned { "pinned" } else { "unpinned" });
        }
        EventAction::Confirm { id } => {
            let id = EventId::from(id);
            let now = ctx.now();
            let confirmed = toggle_confirm(&mut ctx.store, &id, now).ok_or_else(|| not_found(&id))?;
            ctx.save()?;
            println!("{id} {}", if confirmed { "confirmed" } else { "unconfirmed" });
        }
        EventAction::Done { id } => {
            let id = EventId::from(id);
            if !ctx.store.mark_done(&id) {
                return Err(not_found(&id).into());
            }
            ctx.save()?;
            println!("{id} done");
        }
        EventAction::Undo { id } => {
            let id = EventId::from(id);
            if !undo_done(&mut ctx.store, &id) {
                return Err(not_found(&id).into());
            }
            ctx.save()?;
            println!("{id} reopened");
        }
    }
    Ok(())
}

fn not_found(id: &EventId) -> String {
    format!("event not found: {id}")
}

fn describe(ctx: &Context, event: &KitchenEvent, status: &str) -> String {
    let end = event
        .end_time
        .map(|t| format!("-{}", ctx.zone.local(t).format("%H:%M")))
        .unwrap_or_default();
    let people: Vec<&str> = event.participants.iter().map(PersonId::as_str).collect();
    let mut flags = String::new();
    if event.pinned {
        flags.push_str(" [pinned]");
    }
    if event.confirmed {
        flags.push_str(" [confirmed]");
    }
    format!(
        "{:<40} {}{end} {:<10} {:<8} {} ({}){flags}",
        event.id,
        ctx.format_time(event.start_time),
        event.kind.as_str(),
        status,
        event.title,
        people.join(", "),
    )
}
