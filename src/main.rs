use clap::Parser;
use ppap::cli::{Cli, Mode};
use ppap::config::Settings;

fn main() {
    let cli = Cli::parse();
    ppap::logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        ppap::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> ppap::errors::Result<()> {
    // Validate the flags before touching the filesystem.
    let mode = cli.mode()?;

    // The invocation directory anchors the config file, the work root and
    // relative key paths from the config.
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    match mode {
        Mode::Encrypt => ppap::cli::commands::encrypt::execute(cli, &settings, &cwd),
        Mode::Decrypt => ppap::cli::commands::decrypt::execute(cli, &settings, &cwd),
    }
}
