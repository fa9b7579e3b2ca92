//! Interactive operator on the terminal
//!
//! Reads answers line by line from any `BufRead`; the binary hands it
//! locked stdin. Prompts and progress go through [`Output`].

use std::cell::RefCell;
use std::io::{self, BufRead, StdinLock};

use lib_deploy::errors::{DeployError, DeployResult};
use lib_deploy::{Operator, PendingEvent, Step};
use tracing::warn;

use crate::error::{CliError, CliResult};
use crate::output::Output;

pub struct ConsoleOperator<'a, R: BufRead> {
    input: RefCell<R>,
    output: &'a dyn Output,
    /// Answer yes to every confirmation without reading input
    assume_yes: bool,
}

impl<'a> ConsoleOperator<'a, StdinLock<'static>> {
    pub fn stdin(output: &'a dyn Output, assume_yes: bool) -> Self {
        Self::new(io::stdin().lock(), output, assume_yes)
    }
}

impl<'a, R: BufRead> ConsoleOperator<'a, R> {
    pub fn new(input: R, output: &'a dyn Output, assume_yes: bool) -> Self {
        Self {
            input: RefCell::new(input),
            output,
            assume_yes,
        }
    }

    fn prompt_input(&self, label: &str) -> DeployResult<String> {
        self.output.prompt(label).map_err(terminal_error)?;

        let mut line = String::new();
        self.input
            .borrow_mut()
            .read_line(&mut line)
            .map_err(|e| terminal_error(CliError::IoError(e)))?;
        Ok(line.trim().to_string())
    }

    /// Progress output is best effort
    fn show(&self, printed: CliResult<()>) {
        if let Err(e) = printed {
            warn!("Could not write progress to the terminal: {}", e);
        }
    }
}

fn terminal_error(err: CliError) -> DeployError {
    DeployError::ExternalCall {
        action: "Operator terminal".to_string(),
        output: err.to_string(),
    }
}

/// Only an explicit yes counts
pub fn parse_yes_no(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

impl<R: BufRead> Operator for ConsoleOperator<'_, R> {
    fn resolve(&self, event: &PendingEvent) -> DeployResult<Option<String>> {
        let answer = self.prompt_input(&event.prompt())?;
        if answer.is_empty() {
            self.output
                .warning("No value entered. Re-run this step once you have it.")
                .map_err(terminal_error)?;
            return Ok(None);
        }
        Ok(Some(answer))
    }

    fn confirm(&self, question: &str) -> DeployResult<bool> {
        if self.assume_yes {
            self.output
                .print(&format!("{} yes", question))
                .map_err(terminal_error)?;
            return Ok(true);
        }
        let answer = self.prompt_input(&format!("{} (yes/no)", question))?;
        Ok(parse_yes_no(&answer))
    }

    fn step_started(&self, step: Step) {
        self.show(self.output.step_banner(step));
    }

    fn notify(&self, message: &str) {
        self.show(self.output.info(message));
    }
}
