//! Input dispatcher.
//!
//! [`LogicManager`] turns one raw input line into a [`CommandResult`]:
//! it parses, holds destructive commands until the user types
//! [`CONFIRM_TOKEN`], runs the command against the [`ModelManager`], hands
//! changed data to [`Storage`] and records the raw input.

use crate::collection::SaveIt;
use crate::command::{Command, CommandContext, CommandResult, CommandWord};
use crate::error::{LogicError, ParseError};
use crate::input_history::InputHistory;
use crate::manager::ModelManager;
use crate::model::{Index, Issue, Solution, Tag};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

/// Raw input that answers a confirmation prompt with "go ahead". Only the
/// exact string counts; surrounding whitespace cancels.
pub const CONFIRM_TOKEN: &str = "yes";

/// Turns a raw input line into a [`Command`].
pub trait CommandParser {
    /// # Errors
    ///
    /// [`ParseError::UnknownCommand`] for an unrecognised first word,
    /// [`ParseError::InvalidCommandFormat`] for bad arguments.
    fn parse(&self, input: &str) -> Result<Command, ParseError>;
}

/// Receives the collection every time a command changed it.
pub trait Storage {
    /// # Errors
    ///
    /// Any I/O or encoding failure.
    fn save_save_it(&self, save_it: &SaveIt) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Confirmation {
    #[default]
    Idle,
    Awaiting { word: CommandWord, command: Command },
}

#[must_use]
pub fn confirmation_prompt(word: CommandWord) -> String {
    format!("Are you sure you want to {word}? Enter `{CONFIRM_TOKEN}` to confirm.")
}

#[must_use]
pub fn confirmation_failed(word: CommandWord) -> String {
    format!("Confirmation failed, {word} was not executed.")
}

pub struct LogicManager<P, S> {
    parser: P,
    storage: S,
    model: ModelManager,
    inputs: InputHistory,
    confirmation: Confirmation,
    last_selected: Option<Index>,
}

impl<P: CommandParser, S: Storage> LogicManager<P, S> {
    #[must_use]
    pub fn new(parser: P, storage: S, model: ModelManager, inputs: InputHistory) -> Self {
        Self {
            parser,
            storage,
            model,
            inputs,
            confirmation: Confirmation::Idle,
            last_selected: None,
        }
    }

    /// Handle one raw input line.
    ///
    /// The input is recorded in the input history whatever the outcome.
    ///
    /// # Errors
    ///
    /// [`LogicError::Parse`] and [`LogicError::Command`] leave the data as it
    /// was. [`LogicError::Storage`] means the command took effect in memory
    /// but could not be saved.
    pub fn execute(&mut self, raw: &str) -> Result<CommandResult, LogicError> {
        debug!(input = raw, "executing input");
        let previous_selection = self.last_selected.take();
        let outcome = self.dispatch(raw, previous_selection);
        let saved = self.save_if_changed();
        self.inputs.add(raw);

        let result = outcome?;
        saved?;
        Ok(result)
    }

    fn dispatch(
        &mut self,
        raw: &str,
        previous_selection: Option<Index>,
    ) -> Result<CommandResult, LogicError> {
        if let Confirmation::Awaiting { word, command } = std::mem::take(&mut self.confirmation) {
            if raw == CONFIRM_TOKEN {
                info!(%word, "confirmed destructive command");
                return self.run(&command, previous_selection);
            }
            warn!(%word, "confirmation rejected");
            return Ok(CommandResult::new(confirmation_failed(word)));
        }

        let command = self.parser.parse(raw)?;
        if command.is_destructive() {
            let word = command.word();
            self.confirmation = Confirmation::Awaiting { word, command };
            return Ok(CommandResult::new(confirmation_prompt(word)));
        }
        self.run(&command, previous_selection)
    }

    fn run(
        &mut self,
        command: &Command,
        previous_selection: Option<Index>,
    ) -> Result<CommandResult, LogicError> {
        let ctx = CommandContext {
            inputs: &self.inputs,
            last_selected: previous_selection,
        };
        let result = command.execute(&mut self.model, ctx)?;
        if let Command::Select(index) = command {
            self.last_selected = Some(*index);
        }
        Ok(result)
    }

    fn save_if_changed(&mut self) -> Result<(), LogicError> {
        if !self.model.take_changed() {
            return Ok(());
        }
        self.storage
            .save_save_it(self.model.save_it())
            .map_err(|err| {
                let message = format!("{err:#}");
                error!(error = %message, "failed to save data");
                LogicError::Storage(message)
            })
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    #[must_use]
    pub const fn model(&self) -> &ModelManager {
        &self.model
    }

    #[must_use]
    pub fn sorted_issues(&self) -> Vec<&Issue> {
        self.model.sorted_issues()
    }

    /// Solutions of the selected issue in display order, if one is selected.
    #[must_use]
    pub fn selected_solutions(&self) -> Option<Vec<(Index, &Solution)>> {
        self.model.selected_solutions()
    }

    #[must_use]
    pub fn selected_issue(&self) -> Option<&Issue> {
        self.model.selected_issue().map(|(_, issue)| issue)
    }

    #[must_use]
    pub const fn input_history(&self) -> &InputHistory {
        &self.inputs
    }

    #[must_use]
    pub fn current_tag_set(&self) -> BTreeSet<Tag> {
        self.model.current_tag_set()
    }

    #[must_use]
    pub const fn last_selected_index(&self) -> Option<Index> {
        self.last_selected
    }

    /// Whether the next input answers a confirmation prompt.
    #[must_use]
    pub const fn is_awaiting_confirmation(&self) -> bool {
        matches!(self.confirmation, Confirmation::Awaiting { .. })
    }
}
