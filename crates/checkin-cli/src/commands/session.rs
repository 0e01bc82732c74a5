use checkin_core::{CheckInContract, Config, CountdownEngine, Session, SystemClock};
use clap::Args;

use crate::output::TerminalSink;

type CliSession = Session<CheckInContract, SystemClock, TerminalSink>;

#[derive(Args)]
pub struct StatusArgs {
    /// Read this account instead of the wallet's
    #[arg(long)]
    address: Option<String>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Watch this account instead of the wallet's
    #[arg(long)]
    address: Option<String>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct CheckInArgs {
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

fn open_session(json: bool, live: bool) -> Result<CliSession, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let contract = CheckInContract::from_config(&config)?;
    let engine = CountdownEngine::new(SystemClock, TerminalSink::new(json, live));
    let session = Session::new(contract, engine);
    Ok(session.embedded(config.host.embedded))
}

fn close(session: &mut CliSession) {
    session.stop();
    session.engine().sink().finish();
}

pub async fn status(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(args.json, false)?;
    let result = session.connect(args.address.as_deref()).await;
    close(&mut session);
    result?;
    Ok(())
}

pub async fn watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(args.json, true)?;
    if let Err(e) = session.connect(args.address.as_deref()).await {
        close(&mut session);
        return Err(e.into());
    }
    tokio::signal::ctrl_c().await?;
    close(&mut session);
    Ok(())
}

pub async fn check_in(args: CheckInArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(args.json, false)?;
    let result = match session.connect(None).await {
        Ok(_) => session.check_in().await.map(|_| ()),
        Err(e) => Err(e),
    };
    close(&mut session);
    result?;
    Ok(())
}
