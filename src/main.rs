use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tasktrack::config::Config;
use tasktrack::error::Result;
use tasktrack::shell::Shell;
use tasktrack::store::Store;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let store = Store::new(&Config::default());
    if let Err(err) = run(&store) {
        tracing::debug!(error = ?err, "task tracker stopped");
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(store: &Store) -> Result<()> {
    store.initialize()?;

    let stdout = io::stdout();
    let styled = stdout.is_terminal();
    Shell::new(store, io::stdin().lock(), stdout.lock())
        .styled(styled)
        .run()
}
