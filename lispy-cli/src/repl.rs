use lispy::interpreter;
use rustyline::{error::ReadlineError, history::History, Editor, Helper};

const HISTORY_FILE: &str = ".lispyhistory";

pub fn greet() {
    eprintln!("Welcome to Lispy REPL. Press Ctrl-D to exit.")
}

pub type Error = ReadlineError;

fn run_line(ip: &interpreter::Interpreter, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    match ip.eval(line) {
        Ok(exp) => println!("{}", exp),
        Err(err) => eprintln!("Error -- {}", err),
    }
}

fn run_loop<H: Helper, I: History>(
    ip: &interpreter::Interpreter,
    editor: &mut Editor<H, I>,
) -> Result<(), Error> {
    loop {
        match editor.readline(">> ") {
            Ok(line) => run_line(ip, &line),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

pub fn run() -> Result<(), Error> {
    let ip = interpreter::Interpreter::default();
    let mut editor = {
        let config = rustyline::Config::builder()
            .auto_add_history(true)
            .completion_type(rustyline::CompletionType::List)
            .build();
        rustyline::Editor::<(), _>::with_config(config)?
    };
    if editor.load_history(HISTORY_FILE).is_err() {
        tracing::debug!(file = HISTORY_FILE, "no previous history");
    }
    let res = run_loop(&ip, &mut editor);
    _ = editor.save_history(HISTORY_FILE);
    res
}
