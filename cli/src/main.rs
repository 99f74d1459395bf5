mod adapters;
mod commands;
mod terminal;

use std::sync::Arc;

use commands::CommandLine;
use keyscout_core::aggregator;
use terminal::{logging, print, spinner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init();

    // Static configuration problems fail here, before any host is touched.
    let (hosts, cfg) = commands.into_parts()?;

    print::header("recovering product keys");

    let deps = Arc::new(adapters::collaborators(&cfg));
    let sp = spinner::start(format!("Querying {} host(s)...", hosts.len()));
    let records = aggregator::recover_keys(hosts, Arc::new(cfg), deps).await;
    sp.finish_and_clear();

    print::records(&records);
    print::end_of_program();
    Ok(())
}
