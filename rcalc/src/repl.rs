//! Interactive RPN calculator
//!
//! Each line is evaluated against a persistent stack, which is printed
//! after every successful line. Lines starting with `/` are REPL commands.
//! Matrices and vectors may span several lines; input continues until its
//! brackets balance.

use crate::render;
use miette::Diagnostic;
use rcalc_interpreter::{CalculatorSession, EvalError, LookupStrategy};
use rcalc_ops::DeclarationError;
use rustyline::{DefaultEditor, error::ReadlineError};
use thiserror::Error;

/// Errors that can occur in the REPL
#[derive(Debug, Error, Diagnostic)]
pub enum ReplError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),

    #[error("Could not build the operator set: {source}")]
    Setup {
        #[from]
        source: DeclarationError,
    },

    #[error("Readline error: {source}")]
    Readline {
        #[from]
        source: ReadlineError,
    },

    #[error("REPL command error: {message}")]
    #[diagnostic(help("Type /help for available commands"))]
    Command { message: String },
}

/// REPL configuration options
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show the type of every stack level
    pub show_types: bool,

    /// Show the debug form of errors instead of a report
    pub verbose_errors: bool,

    /// Stack levels printed after each line
    pub max_display_items: usize,

    pub prompt: String,

    pub persist_history: bool,

    pub history_file: Option<String>,

    pub lookup: LookupStrategy,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_types: false,
            verbose_errors: false,
            max_display_items: 10,
            prompt: "rcalc> ".to_string(),
            persist_history: true,
            history_file: Some(".rcalc_history".to_string()),
            lookup: LookupStrategy::default(),
        }
    }
}

/// REPL session statistics
#[derive(Debug, Clone, Default)]
pub struct ReplStats {
    pub lines_evaluated: usize,
    pub operators_dispatched: usize,
    pub errors_encountered: usize,
    pub commands_executed: usize,
}

/// Result of evaluating a line in the REPL
#[derive(Debug)]
pub enum ReplResult {
    /// The stack after a successful line
    Stack { lines: Vec<String> },

    Command { message: String },

    /// Empty line or comment
    Empty,

    Exit,
}

/// REPL session that keeps the stack across lines
pub struct ReplSession {
    editor: DefaultEditor,
    calculator: CalculatorSession,
    config: ReplConfig,
    stats: ReplStats,
}

impl ReplSession {
    pub fn with_config(config: ReplConfig) -> Result<Self, ReplError> {
        let mut editor = DefaultEditor::new()?;

        if config.persist_history {
            if let Some(ref history_file) = config.history_file {
                let _ = editor.load_history(history_file); // missing on first run
            }
        }

        let calculator = CalculatorSession::standard(config.lookup)?;

        Ok(Self {
            editor,
            calculator,
            config,
            stats: ReplStats::default(),
        })
    }

    /// Start the REPL main loop
    pub fn run(&mut self) -> Result<(), ReplError> {
        self.print_welcome();

        while let Some(line) = self.read_line()? {
            match self.evaluate_line(&line) {
                Ok(ReplResult::Exit) => break,
                Ok(result) => self.display_result(result),
                Err(error) => {
                    self.stats.errors_encountered += 1;
                    self.display_error(error, &line);
                }
            }
        }

        println!("Goodbye!");
        self.save_history()?;
        Ok(())
    }

    /// Read one logical line, continuing while brackets are open
    fn read_line(&mut self) -> Result<Option<String>, ReplError> {
        let mut complete_input = String::new();

        loop {
            let prompt = if complete_input.is_empty() {
                self.config.prompt.as_str()
            } else {
                "... "
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    if complete_input.is_empty() && line.trim().is_empty() {
                        return Ok(Some(String::new()));
                    }

                    if !complete_input.is_empty() {
                        complete_input.push('\n');
                    }
                    complete_input.push_str(&line);

                    if is_input_complete(&complete_input) {
                        self.editor.add_history_entry(complete_input.as_str())?;
                        return Ok(Some(complete_input));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(source) => return Err(ReplError::Readline { source }),
            }
        }
    }

    /// Evaluate a line of input
    pub fn evaluate_line(&mut self, line: &str) -> Result<ReplResult, ReplError> {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(ReplResult::Empty);
        }

        if trimmed.starts_with('/') {
            return self.execute_command(trimmed);
        }

        let outcome = self.calculator.eval_line(trimmed)?;
        self.stats.lines_evaluated += 1;
        self.stats.operators_dispatched += outcome.dispatched.len();

        Ok(ReplResult::Stack {
            lines: self.stack_lines(),
        })
    }

    fn execute_command(&mut self, command: &str) -> Result<ReplResult, ReplError> {
        self.stats.commands_executed += 1;

        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some(name) = parts.first() else {
            return Ok(ReplResult::Empty);
        };

        match *name {
            "/help" | "/h" => Ok(ReplResult::Command {
                message: help_message(),
            }),

            "/stack" | "/s" => Ok(ReplResult::Stack {
                lines: self.stack_lines(),
            }),

            "/ops" => Ok(ReplResult::Command {
                message: render::operators(self.calculator.operators()),
            }),

            "/table" => {
                let Some(operator) = parts.get(1) else {
                    return Err(ReplError::Command {
                        message: "Usage: /table <operator>".to_string(),
                    });
                };
                let registry = self
                    .calculator
                    .operators()
                    .operator(operator)
                    .ok_or_else(|| ReplError::Command {
                        message: format!("Unknown operator: {operator}"),
                    })?;
                Ok(ReplResult::Command {
                    message: render::table(registry),
                })
            }

            "/clear" => {
                self.calculator.clear();
                Ok(ReplResult::Command {
                    message: "Stack cleared".to_string(),
                })
            }

            "/stats" => Ok(ReplResult::Command {
                message: self.format_stats(),
            }),

            "/config" => Ok(ReplResult::Command {
                message: self.format_config(),
            }),

            "/types" => match parts.get(1) {
                Some(&"on") => {
                    self.config.show_types = true;
                    Ok(ReplResult::Command {
                        message: "Type display enabled".to_string(),
                    })
                }
                Some(&"off") => {
                    self.config.show_types = false;
                    Ok(ReplResult::Command {
                        message: "Type display disabled".to_string(),
                    })
                }
                _ => Ok(ReplResult::Command {
                    message: format!(
                        "Type display is {}",
                        if self.config.show_types { "on" } else { "off" }
                    ),
                }),
            },

            "/quit" | "/q" | "/exit" => Ok(ReplResult::Exit),

            unknown => Err(ReplError::Command {
                message: format!("Unknown command: {unknown}"),
            }),
        }
    }

    fn stack_lines(&self) -> Vec<String> {
        render::stack(
            self.calculator.stack(),
            self.config.show_types,
            self.config.max_display_items,
        )
    }

    fn display_result(&self, result: ReplResult) {
        match result {
            ReplResult::Stack { lines } => {
                for line in lines {
                    println!("{line}");
                }
            }
            ReplResult::Command { message } => println!("{message}"),
            ReplResult::Empty | ReplResult::Exit => {}
        }
    }

    fn display_error(&self, error: ReplError, source_code: &str) {
        if self.config.verbose_errors {
            eprintln!("Error: {error:?}");
            return;
        }

        match error {
            // parse errors carry their own source
            ReplError::Eval(EvalError::Parse(source)) => {
                eprintln!("{:?}", miette::Report::new(source));
            }
            error => {
                let named_source = miette::NamedSource::new("<repl>", source_code.to_string());
                let report = miette::Report::new(error).with_source_code(named_source);
                eprintln!("{report:?}");
            }
        }
    }

    fn print_welcome(&self) {
        println!("RCalc v{}", env!("CARGO_PKG_VERSION"));
        println!("Type /help for commands, /quit to exit");
        println!();
    }

    fn save_history(&mut self) -> Result<(), ReplError> {
        if self.config.persist_history {
            if let Some(ref history_file) = self.config.history_file {
                self.editor.save_history(history_file)?;
            }
        }
        Ok(())
    }

    fn format_stats(&self) -> String {
        format!(
            r#"Session Statistics:
  Lines evaluated: {}
  Operators dispatched: {}
  Errors encountered: {}
  Commands executed: {}
  Stack depth: {}"#,
            self.stats.lines_evaluated,
            self.stats.operators_dispatched,
            self.stats.errors_encountered,
            self.stats.commands_executed,
            self.calculator.stack().len()
        )
    }

    fn format_config(&self) -> String {
        format!(
            r#"REPL Configuration:
  Show types: {}
  Verbose errors: {}
  Max display items: {}
  Prompt: "{}"
  Persist history: {}
  History file: {}
  Lookup: {:?}"#,
            self.config.show_types,
            self.config.verbose_errors,
            self.config.max_display_items,
            self.config.prompt,
            self.config.persist_history,
            self.config.history_file.as_deref().unwrap_or("<none>"),
            self.calculator.operators().strategy()
        )
    }
}

/// Input is complete once every `[` and `{` is closed
fn is_input_complete(input: &str) -> bool {
    let mut brackets = 0i32;
    let mut braces = 0i32;

    for line in input.lines() {
        let code = line.split('#').next().unwrap_or_default();
        for ch in code.chars() {
            match ch {
                '[' => brackets += 1,
                ']' => brackets -= 1,
                '{' => braces += 1,
                '}' => braces -= 1,
                _ => {}
            }
        }
    }

    brackets <= 0 && braces <= 0
}

fn help_message() -> String {
    r#"RCalc REPL Commands:
  /help, /h           Show this help message
  /stack, /s          Show the stack
  /ops                List operators by category
  /table <op>         Show every signature an operator accepts
  /clear              Clear the stack
  /stats              Show session statistics
  /config             Show current configuration
  /types [on|off]     Toggle type display
  /quit, /q, /exit    Exit the REPL

Input is RPN: values are pushed, operators consume them.
  2 3 +               # 5
  [1, 2] 3 *          # [3, 6]
  {[1, 2],            # matrices may span lines
   [3, 4]} Det        # -2

Use Ctrl+C to cancel a line, Ctrl+D to exit."#
        .to_string()
}
