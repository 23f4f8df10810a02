use clap::Parser;
use crossboro::app::{CrossboroApp, CrossboroAppError};

fn main() -> Result<(), CrossboroAppError> {
    let args = CrossboroApp::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("cwd: {:?}", std::env::current_dir());
    args.op.run()
}
