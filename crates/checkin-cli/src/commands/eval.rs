use checkin_core::{evaluate, Clock, Event, SystemClock};
use clap::Args;

#[derive(Args)]
pub struct EvalArgs {
    /// Last check-in, seconds since epoch (0 = never)
    #[arg(long)]
    last_check_in: u64,
    /// Evaluate at this time instead of now, seconds since epoch
    #[arg(long)]
    now: Option<u64>,
    /// Print the state as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: EvalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = args.now.unwrap_or_else(|| SystemClock.now());
    let event = Event::from_state(evaluate(args.last_check_in, now), now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        println!("{}", event.message());
    }
    Ok(())
}
