pub mod cli;
pub mod config;
pub mod console;
pub mod create;
pub mod error;
pub mod formatting;
pub mod note;
pub mod operations;
pub mod placeholder;
pub mod plugins;
pub mod process;
pub mod render;
pub mod serve;
pub mod template;

use clap::{CommandFactory, Parser};
use std::io::{self, IsTerminal, Write};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::console::Console;
use crate::create::NoteCreator;
use crate::error::Result;
use crate::note::ensure_dir;
use crate::operations::ListOptions;
use crate::process::ShellRunner;

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    let runner = ShellRunner;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        let cfg = Config::load()?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        plugins::print_usages(&cfg, &runner, &mut out)?;
        out.flush()?;
        return Ok(());
    };

    let cfg = Config::load()?;
    ensure_dir(cfg.memo_dir())?;
    log::debug!("memo dir: {}", cfg.memo_dir().display());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let interactive = stdin.is_terminal();
    let tty = stdout.is_terminal();
    let mut input = stdin.lock();
    let mut out = stdout.lock();

    match command {
        Commands::New { title } => {
            let mut console = Console::new(&mut input, &mut out, interactive);
            let creator = NoteCreator {
                dir: cfg.memo_dir(),
                template: cfg.template_path(),
                editor: &cfg.editor,
                runner: &runner,
            };
            creator.create(title, &mut console, &chrono::Local::now())?;
        }
        Commands::List { fullpath, format, pattern } => {
            let opts = ListOptions { fullpath, format, pattern, tty };
            operations::list(&cfg, &opts, &mut out)?;
        }
        Commands::Edit { file } => operations::edit(&cfg, file.as_deref(), &runner)?,
        Commands::Cat { file } => operations::cat(&cfg, file.as_deref(), &runner, &mut out)?,
        Commands::Delete { pattern } => {
            let mut console = Console::new(&mut input, &mut out, interactive);
            operations::delete(&cfg, pattern.as_deref(), &mut console)?;
        }
        Commands::Grep { pattern } => operations::grep(&cfg, pattern.as_deref(), &runner)?,
        Commands::Config { cat } => operations::config(&cfg, cat, &runner, &mut out)?,
        Commands::Serve { addr } => serve::serve(&cfg, &addr)?,
        Commands::Plugin(mut args) => {
            let name = args.remove(0);
            plugins::run(&cfg, &name, &args, &runner)?;
        }
    }
    out.flush()?;
    Ok(())
}
