use std::cell::RefCell;
use std::io::{BufRead, Write};

use log::{debug, error};

use crate::external_api::ApiError;
use crate::management_list::{ConfirmDialog, Notifier};

/// Writes notifications to the given output. Errors are only logged at debug
/// level: the command that failed reports them to the user once.
pub struct TerminalNotifier<W: Write> {
    output: RefCell<W>,
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(output: W) -> Self {
        Self { output: RefCell::new(output) }
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn show_info(&self, message: &str) {
        let mut output = self.output.borrow_mut();
        if writeln!(output, "{message}").and_then(|_| output.flush()).is_err() {
            error!("Failed to write to stdout: {message}");
        }
    }

    fn show_error(&self, message: &str, error: &ApiError) {
        debug!("{message}: {error}");
    }
}

/// Asks on `output` and reads the answer from `input`; only "y" or "yes" confirm
pub struct PromptConfirm<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmDialog for PromptConfirm<R, W> {
    fn confirm(&mut self, title: &str, message: &str) -> Result<bool, ApiError> {
        write!(self.output, "{title}: {message} [y/N] ")?;
        self.output.flush()?;

        let mut confirmation = String::new();
        self.input.read_line(&mut confirmation)?;

        let trimmed = confirmation.trim().to_lowercase();
        Ok(matches!(trimmed.as_str(), "y" | "yes"))
    }
}

/// Confirms without asking, for `--yes`
pub struct AutoConfirm;

impl ConfirmDialog for AutoConfirm {
    fn confirm(&mut self, _title: &str, _message: &str) -> Result<bool, ApiError> {
        Ok(true)
    }
}
