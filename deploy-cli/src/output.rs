//! Terminal output for the deployment commands
//!
//! Commands and the console operator write through [`Output`] so tests can
//! capture exactly what an operator would see. Errors go to stderr, the rest
//! to stdout.

use std::io::{self, Write};

use lib_deploy::Step;

use crate::error::CliResult;

/// Width of the label column in [`Output::field`]
const FIELD_WIDTH: usize = 11;

pub trait Output: Send + Sync {
    fn print(&self, msg: &str) -> CliResult<()>;

    fn error(&self, msg: &str) -> CliResult<()>;

    /// Show a prompt and leave the cursor on the same line
    fn prompt(&self, label: &str) -> CliResult<()>;

    /// Pretty JSON for `--format json`
    fn print_json(&self, data: &serde_json::Value) -> CliResult<()> {
        self.print(&serde_json::to_string_pretty(data)?)
    }

    fn success(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("✅ {}", msg))
    }

    fn warning(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("⚠️  {}", msg))
    }

    fn info(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("ℹ️  {}", msg))
    }

    /// Section title underlined to its character width
    fn header(&self, title: &str) -> CliResult<()> {
        self.print(&format!("\n{}\n{}", title, "=".repeat(title.chars().count())))
    }

    /// Banner printed before a pipeline step runs
    fn step_banner(&self, step: Step) -> CliResult<()> {
        self.header(&format!(
            "STEP {}: {}",
            step.index(),
            step.name().to_uppercase()
        ))
    }

    /// `label: value` with values aligned in one column
    fn field(&self, label: &str, value: &str) -> CliResult<()> {
        self.print(&format!(
            "{:<width$} {}",
            format!("{}:", label),
            value,
            width = FIELD_WIDTH
        ))
    }
}

pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn print(&self, msg: &str) -> CliResult<()> {
        println!("{}", msg);
        Ok(())
    }

    fn error(&self, msg: &str) -> CliResult<()> {
        eprintln!("❌ {}", msg);
        Ok(())
    }

    fn prompt(&self, label: &str) -> CliResult<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}: ", label)?;
        stdout.flush()?;
        Ok(())
    }
}
