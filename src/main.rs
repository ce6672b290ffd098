// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.

//! CLI entry point. Resolves the configuration file via `platform-dirs`,
//! builds the DSL `Environment`, and either runs a script file
//! non-interactively or hands off to the interactive REPL (`repl.rs`).

mod config;
mod repl;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use config::Config;
use nitrous::Environment;
use platform_dirs::AppDirs;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use structopt::StructOpt;

const APP_QUALIFIER: &str = "skywatch";
const CONFIG_FILE_NAME: &str = "config.ini";

/// An interactive DSL for observing the solar system.
#[derive(Debug, StructOpt)]
#[structopt(name = "skywatch")]
struct Opt {
    /// Script file to run non-interactively; omit to start the REPL.
    script: Option<PathBuf>,

    /// Override the default configuration file location.
    #[structopt(short = "c", long = "config")]
    config: Option<PathBuf>,

    /// Raise log verbosity (repeatable: warn -> info -> debug -> trace).
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Skip loading any configuration file and start from built-in defaults.
    #[structopt(long = "no-config")]
    no_config: bool,
}

fn main() -> ExitCode {
    let opt = Opt::from_args();
    init_logging(opt.verbose);

    match run(opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn run(opt: Opt) -> Result<()> {
    let config = load_config(&opt)?;

    let now = Utc::now();
    let mut env = Environment::new(now);
    env.tz_hours = config.tz_hours;
    env.echo = config.echo;
    env.log_level = config.log_level.clone();
    env.set_home_default(config.here_observer());
    env.chokai = config.chokai_observer();

    let mut evaluator = nitrous::Evaluator::new(env);

    match &opt.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("could not read script file {}", path.display()))?;
            repl::run_script(&mut evaluator, &source)
        }
        None => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut shell = repl::Repl::new(stdin.lock(), stdout.lock(), evaluator);
            shell.run()
        }
    }
}

/// Resolves and loads the configuration file. A missing file at the
/// default location is not an error; a malformed file at an
/// explicitly-given `--config` path still parses leniently (bad
/// individual keys just warn and fall back) so only a genuinely
/// unreadable explicit path is fatal.
fn load_config(opt: &Opt) -> Result<Config> {
    if opt.no_config {
        return Ok(Config::default());
    }

    let path = match &opt.config {
        Some(p) => p.clone(),
        None => {
            let app_dirs = AppDirs::new(Some(APP_QUALIFIER), true)
                .ok_or_else(|| anyhow!("unable to determine the configuration directory"))?;
            fs::create_dir_all(&app_dirs.config_dir)
                .with_context(|| format!("could not create {}", app_dirs.config_dir.display()))?;
            app_dirs.config_dir.join(CONFIG_FILE_NAME)
        }
    };

    if !path.exists() {
        if opt.config.is_some() {
            return Err(anyhow!("configuration file not found: {}", path.display()));
        }
        return Ok(Config::default());
    }

    Config::load(&path).with_context(|| format!("could not load configuration file {}", path.display()))
}
