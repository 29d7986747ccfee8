use clap::Parser;
use kpm::api::{self, AppState};
use kpm::cli::{cmd_allocate, cmd_init, cmd_players, cmd_save, cmd_status, CliError};
use kpm::config::{Args, Command};
use kpm::kpm_core::RedbStore;
use kpm::logging::init_logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_format);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let db = args.db.as_path();
    match args.command {
        Command::Init { force } => cmd_init(db, force),
        Command::Save { file } => cmd_save(db, &file),
        Command::Status { json } => cmd_status(db, json),
        Command::Players { year, json } => cmd_players(db, year, json),
        Command::Allocate { file, output } => cmd_allocate(&file, output.as_deref()),
        Command::Serve { bind } => {
            let store = RedbStore::open(db)?;
            tracing::info!(db = %db.display(), "opened roster database");

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(api::serve(AppState::new(store), bind))?;
            Ok(())
        }
    }
}
