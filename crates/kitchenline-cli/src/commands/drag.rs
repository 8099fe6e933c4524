//! Headless drag: replays a full gesture against a synthetic surface and
//! commits through the event file, printing every notification.

use chrono::{DateTime, Utc};
use clap::Args;
use kitchenline_core::timeline::HOUR_MS;
use kitchenline_core::{
    DragController, DragEvent, EventId, EventSource, Flattener, LayoutMode, PointerSample, SyntheticSurface,
};

use super::{parse_time, Context, Globals};

/// Gap between simulated pointer moves.
const FRAME_MS: u64 = 16;

#[derive(Args)]
pub struct DragArgs {
    /// Event to drag
    id: String,
    /// Where to drop its dot ("YYYY-MM-DD HH:MM" local, or RFC 3339)
    #[arg(long)]
    to: String,
    /// Pointer moves between pick-up and drop
    #[arg(long, default_value_t = 4)]
    steps: u32,
    /// Output notifications as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: DragArgs, globals: &Globals) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::open(globals)?;
    let target = parse_time(&args.to, ctx.zone)?;
    let id = EventId::from(args.id);
    let now = ctx.now();
    let flattener = Flattener::new(ctx.zone).with_status_engine(ctx.config.status_engine());
    let scale = ctx.config.scale();
    let gap_px = ctx.config.layout.collapsed_gap_px;
    let dot_offset = ctx.config.drag.dot_offset_px;

    let events = ctx.store.snapshot();
    let measure = |mode: LayoutMode| {
        let items = flattener.flatten(events.iter(), now, mode);
        SyntheticSurface::measure(&items, scale.px_per_hour(mode), gap_px)
    };
    let compact = measure(LayoutMode::Compact);
    let expanded = measure(LayoutMode::Expanded);
    let mut log = Vec::new();
    let mut controller = DragController::from_config(&ctx.config);

    let mut at_ms = 0;
    let prepared = controller
        .drag_start(&id, &events, compact.event_y(&id), at_ms)
        .ok_or_else(|| format!("event not found: {id}"))?;
    log.push(prepared);

    at_ms += ctx.config.drag.settle_ms;
    log.extend(controller.tick(at_ms));

    let steps = args.steps.max(1);
    let start_y = expanded.event_y(&id);
    let target_y = controller.mapper().position_of(&expanded.ticks, target);
    let original = events.iter().find(|e| e.id == id).map_or(target, |e| e.start_time);
    let target_delta = hours_between(original, target) * controller.mapper().px_per_hour();
    for step in 1..=steps {
        at_ms += FRAME_MS;
        let fraction = f64::from(step) / f64::from(steps);
        let sample = match (start_y, target_y) {
            (Some(from), Some(to)) => {
                let y = from + (to - from) * fraction;
                PointerSample::new(Some(y - dot_offset), Some(from - dot_offset), y - from)
            }
            // Nothing measured: drive the drag by pointer delta alone.
            _ => PointerSample::from_delta(target_delta * fraction),
        };
        log.extend(controller.pointer_move(sample, &expanded, &events, at_ms));
    }

    at_ms += FRAME_MS;
    log.extend(controller.drag_end(&mut ctx.store, expanded.event_y(&id), at_ms));
    at_ms += ctx.config.drag.settle_ms;
    log.extend(controller.tick(at_ms));
    ctx.save()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        for event in &log {
            println!("{}", describe(&ctx, event));
        }
    }
    Ok(())
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / HOUR_MS as f64
}

fn describe(ctx: &Context, event: &DragEvent) -> String {
    match event {
        DragEvent::Prepared {
            session,
            event_id,
            original_time,
        } => format!("{session} prepared {event_id} at {}", ctx.format_time(*original_time)),
        DragEvent::Activated { session, .. } => format!("{session} dragging"),
        DragEvent::Preview {
            session,
            preview_time,
            blocked,
            ..
        } => format!(
            "{session} preview {}{}",
            ctx.format_time(*preview_time),
            if *blocked { " (blocked)" } else { "" }
        ),
        DragEvent::Committed {
            session,
            event_id,
            from,
            to,
        } => format!(
            "{session} committed {event_id} {} -> {}",
            ctx.format_time(*from),
            ctx.format_time(*to)
        ),
        DragEvent::Discarded {
            session,
            event_id,
            reason,
        } => format!("{session} discarded {event_id} ({})", reason.as_str()),
        DragEvent::Settled { session } => format!("{session} settled"),
    }
}
