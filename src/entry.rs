use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::debug;

use crate::args::{Command, TesterArgs};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    crate::logger::init_logging(args.verbose);

    match args.command.as_ref() {
        Some(Command::Report(report)) => return crate::report::run_report(report),
        Some(Command::Compare(compare)) => return crate::report::run_compare(compare),
        Some(Command::Plot(plot)) => return crate::report::run_plot(plot),
        Some(Command::Sweep(_)) | None => {}
    }

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }
    debug!("Resolved options: {:?}", args);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args))
}

fn parse_args() -> AppResult<(TesterArgs, ArgMatches)> {
    let matches = TesterArgs::command().get_matches();
    let args = TesterArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(args: &TesterArgs) -> AppResult<()> {
    match args.command.as_ref() {
        Some(Command::Sweep(sweep)) => crate::app::run_sweep(args, sweep).await,
        Some(Command::Report(_) | Command::Compare(_) | Command::Plot(_)) | None => {
            crate::app::run_local(args).await
        }
    }
}
