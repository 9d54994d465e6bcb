// File: src/repl.rs
//
// Interactive REPL for Ember. One VM persists for the whole session, so
// globals and interned strings carry over between inputs. Input spanning
// multiple lines is accumulated until delimiters balance.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::vm::Vm;

pub struct Repl {
    vm: Vm,
    editor: DefaultEditor,
}

impl Repl {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { vm: Vm::new(), editor })
    }

    fn show_banner(&self) {
        println!("{} {}", "ember".bright_yellow().bold(), env!("CARGO_PKG_VERSION"));
        println!("Type {} for commands, {} or Ctrl+D to leave.", ":help".cyan(), ":quit".cyan());
    }

    /// Runs the read-eval-print loop until EOF or `:quit`.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        let mut buffer = String::new();
        loop {
            let prompt = if buffer.is_empty() { "> " } else { ".. " };
            match self.editor.readline(prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    if buffer.is_empty() && line.trim_start().starts_with(':') {
                        if !self.handle_command(line.trim()) {
                            break;
                        }
                        continue;
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{} {}", "error:".red().bold(), err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Colon commands. Returns false when the session should end.
    fn handle_command(&mut self, command: &str) -> bool {
        match command {
            ":help" | ":h" => {
                println!("  {}   show this message", ":help".cyan());
                println!("  {}  start over with a fresh interpreter", ":reset".cyan());
                println!("  {}   leave the REPL", ":quit".cyan());
                true
            }
            ":reset" | ":r" => {
                self.vm = Vm::new();
                println!("environment reset");
                true
            }
            ":quit" | ":q" | ":exit" => false,
            _ => {
                println!("unknown command: {} (try {})", command, ":help".cyan());
                true
            }
        }
    }

    fn eval(&mut self, source: &str) {
        if source.trim().is_empty() {
            return;
        }
        if let Err(error) = self.vm.interpret(source) {
            eprint!("{}", error);
        }
    }
}

/// True once every brace, bracket and parenthesis is balanced outside of
/// strings and comments. Decides whether to keep prompting for more lines.
fn is_input_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut in_line_comment = false;
    let mut previous = '\0';

    for c in input.chars() {
        if in_line_comment {
            if c == '\n' {
                in_line_comment = false;
            }
            previous = c;
            continue;
        }
        match c {
            '"' => in_string = !in_string,
            '/' if !in_string && previous == '/' => in_line_comment = true,
            '(' | '[' | '{' if !in_string => depth += 1,
            ')' | ']' | '}' if !in_string => depth -= 1,
            _ => {}
        }
        previous = c;
    }

    !in_string && depth <= 0
}
