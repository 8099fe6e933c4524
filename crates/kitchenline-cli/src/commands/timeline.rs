use clap::Args;
use kitchenline_core::{EventSource, Flattener, LayoutMode, PersonFilter, RenderItem, SyntheticSurface};

use super::{Context, Globals};

#[derive(Args)]
pub struct TimelineArgs {
    /// Lay out every hour instead of collapsing quiet stretches
    #[arg(long)]
    expanded: bool,
    /// Only show events this person takes part in
    #[arg(long)]
    person: Option<String>,
    /// Print measured y positions next to ticks and events
    #[arg(long)]
    positions: bool,
    /// Output render items as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TimelineArgs, globals: &Globals) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open(globals)?;
    let mode = if args.expanded {
        LayoutMode::Expanded
    } else {
        LayoutMode::Compact
    };
    let filter = args.person.map_or(PersonFilter::All, |p| PersonFilter::Person(p.into()));
    let flattener = Flattener::new(ctx.zone)
        .with_status_engine(ctx.config.status_engine())
        .with_filter(filter);

    let events = ctx.store.snapshot();
    let items = flattener.flatten(events.iter(), ctx.now(), mode);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let scale = ctx.config.scale();
    let surface = SyntheticSurface::measure(&items, scale.px_per_hour(mode), ctx.config.layout.collapsed_gap_px);
    let mut ticks = surface.ticks.iter();
    for item in &items {
        let y = match item {
            RenderItem::HourTick { .. } => ticks.next().map(|t| t.y),
            RenderItem::Event { event, .. } => surface.event_y(&event.id),
            _ => None,
        };
        let line = render_line(&ctx, item);
        match y {
            Some(y) if args.positions => println!("{y:>8.1}  {line}"),
            _ if args.positions => println!("{:>8}  {line}", ""),
            _ => println!("{line}"),
        }
    }
    Ok(())
}

fn render_line(ctx: &Context, item: &RenderItem<'_>) -> String {
    match item {
        RenderItem::DaySeparator { date, .. } => format!("── {} ──", date.format("%a %Y-%m-%d")),
        RenderItem::NowLine => format!("▶ now {}", ctx.zone.local(ctx.now()).format("%H:%M")),
        RenderItem::HourTick { label, .. } => format!("{label:>6} ┤"),
        RenderItem::CollapsedGap {
            hours, now_progress, ..
        } => match now_progress {
            Some(p) => format!("       ┆ {hours}h quiet (now {:.0}% through)", p * 100.0),
            None => format!("       ┆ {hours}h quiet"),
        },
        RenderItem::Event { event, status } => {
            let mut line = format!(
                "       │ {} {} {} [{}]",
                ctx.zone.local(event.start_time).format("%H:%M"),
                event.kind.label(),
                event.title,
                status.as_str()
            );
            if event.pinned {
                line.push_str(" (pinned)");
            }
            line
        }
    }
}
