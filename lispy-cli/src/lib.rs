/// Module representing high-level entry-point of the REPL.
pub mod repl;

pub mod run {

    /// Module that holds implementation detail of [`crate::run::run`].
    /// It glues [`lispy::interpreter`] and [`crate::repl`] together.
    mod glue {
        use super::{Mode, Opts};
        use crate::repl;
        use lispy::{expr, interpreter};
        use std::{fs::File, io};
        use thiserror::Error;

        #[derive(Error, Debug)]
        pub enum Error {
            #[error(transparent)]
            Run(#[from] interpreter::Error),
            #[error(transparent)]
            Repl(#[from] repl::Error),
        }

        pub type Result<T> = std::result::Result<T, Error>;

        fn open_file(path: &std::path::Path) -> std::result::Result<File, interpreter::Error> {
            File::open(path).map_err(interpreter::Error::from)
        }

        fn run_script(source: impl io::Read) -> Result<expr::Expression> {
            Ok(interpreter::Interpreter::new().run_source(source)?)
        }

        pub fn run(opts: Opts) -> Result<Option<expr::Expression>> {
            Ok(match opts.mode {
                Mode::Script(path) => Some(run_script(open_file(&path)?)?),
                Mode::Stdin => Some(run_script(io::stdin())?),
                Mode::Repl => {
                    repl::greet();
                    repl::run()?;
                    None
                }
            })
        }

    }

    use std::{path::PathBuf, process::exit};

    #[derive(Debug)]
    pub enum Mode {
        Script(PathBuf),
        Repl,
        Stdin,
    }

    impl Mode {
        /// Piped input is run as a script, a terminal gets the REPL.
        pub fn stdin_or_repl() -> Self {
            if atty::is(atty::Stream::Stdin) {
                Self::Repl
            } else {
                Self::Stdin
            }
        }
    }

    #[derive(Debug)]
    pub struct Opts {
        pub mode: Mode,
    }

    pub fn run(opts: Opts) {
        tracing::debug!(?opts, "starting");
        match glue::run(opts) {
            Ok(o) => {
                if let Some(exp) = o {
                    println!("{}", exp)
                }
            }
            Err(err) => {
                eprintln!("Error -- {}", err);
                exit(1);
            }
        }
    }
}

pub mod parse {
    use anyhow::{Context, Result};
    use itertools::Itertools;
    use lispy::{expr::Expression, parser};
    use std::{fs, path::PathBuf};

    fn inner(file: PathBuf) -> Result<Vec<Expression>> {
        let source = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read file: {}", file.display()))?;
        Ok(parser::parse_script(&source)?)
    }

    pub fn run(file: PathBuf) {
        match inner(file) {
            Ok(x) => println!("{}", x.iter().join("\n")),
            Err(e) => eprintln!("Error -- {:#}", e),
        }
    }
}

pub mod lex {
    use anyhow::{Context, Result};
    use itertools::Itertools;
    use lispy::lexer;
    use std::{fs, path::PathBuf};

    fn inner(file: PathBuf) -> Result<Vec<lexer::Token>> {
        let source = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read file: {}", file.display()))?;
        Ok(lexer::tokenize(&source))
    }

    fn to_str(tok: &lexer::Token) -> String {
        match tok {
            lexer::Token::Atom(a) => a.clone(),
            other => format!("{:?}", other),
        }
    }

    pub fn run(file: PathBuf) {
        match inner(file) {
            Ok(x) => println!("{}", x.iter().map(to_str).join("\n")),

            Err(e) => eprintln!("Error -- {:#}", e),
        }
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
/// A small Scheme-like interpreter written in Rust.
pub struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run program from a script file.
    Run {
        /// Program to run.
        file: PathBuf,
    },
    /// Parse program from a script file.
    Parse {
        /// Program to parse.
        file: PathBuf,
    },

    /// Lex (tokenize) program from a script file.
    Lex {
        /// Program to lex.
        file: PathBuf,
    },
}

/// Logs go to stderr, and only when `RUST_LOG` is set (e.g. `RUST_LOG=lispy=trace`).
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

pub fn run() {
    init_tracing();
    let args = Args::parse();
    let Some(command) = args.command else {
        return run::run(run::Opts {
            mode: run::Mode::stdin_or_repl(),
        });
    };
    match command {
        Commands::Run { file } => {
            run::run(run::Opts {
                mode: run::Mode::Script(file),
            });
        }
        Commands::Parse { file } => parse::run(file),
        Commands::Lex { file } => lex::run(file),
    }
}
