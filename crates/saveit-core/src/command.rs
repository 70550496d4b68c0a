//! Structured commands and what each one does to the model.
//!
//! A [`Command`] is produced by a [`crate::logic::CommandParser`] and run by
//! the [`crate::logic::LogicManager`]. Mutating commands change the working
//! collection through [`ModelManager`] and then commit exactly once; a
//! command that fails never commits.

use crate::collection::SaveIt;
use crate::error::{CommandError, ParseError, SaveItError};
use crate::input_history::InputHistory;
use crate::manager::ModelManager;
use crate::model::{Index, Issue, Solution, Statement, Tag};
use crate::view::{IssueFilter, IssueSort, ordered_solutions};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The first word of every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandWord {
    Add,
    Edit,
    Delete,
    Select,
    Home,
    List,
    Find,
    FindTag,
    Sort,
    Star,
    AddTag,
    RefactorTag,
    Clear,
    Undo,
    Redo,
    History,
    Help,
    Exit,
}

impl CommandWord {
    pub const ALL: [Self; 18] = [
        Self::Add,
        Self::Edit,
        Self::Delete,
        Self::Select,
        Self::Home,
        Self::List,
        Self::Find,
        Self::FindTag,
        Self::Sort,
        Self::Star,
        Self::AddTag,
        Self::RefactorTag,
        Self::Clear,
        Self::Undo,
        Self::Redo,
        Self::History,
        Self::Help,
        Self::Exit,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Select => "select",
            Self::Home => "home",
            Self::List => "list",
            Self::Find => "find",
            Self::FindTag => "findtag",
            Self::Sort => "sort",
            Self::Star => "star",
            Self::AddTag => "addtag",
            Self::RefactorTag => "refactortag",
            Self::Clear => "clear",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::History => "history",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }

    /// Usage line shown with [`ParseError::InvalidCommandFormat`] and `help`.
    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Add => {
                "add: Adds an issue, or a solution to the issue selected just before.\n\
                 Parameters: -s STATEMENT -d DESCRIPTION [-l LINK -r REMARK]... [-t TAG]...\n\
                 \x20       or: -l LINK -r REMARK (right after `select INDEX`)\n\
                 Example: add -s \"null pointer\" -d \"crash on start\" -t java"
            }
            Self::Edit => {
                "edit: Edits the statement and/or description of the issue at INDEX.\n\
                 Parameters: INDEX [-s STATEMENT] [-d DESCRIPTION]\n\
                 Example: edit 1 -d \"only on windows\""
            }
            Self::Delete => {
                "delete: Deletes the issue at INDEX.\nParameters: INDEX\nExample: delete 1"
            }
            Self::Select => {
                "select: Opens the issue at INDEX and shows its solutions.\n\
                 Parameters: INDEX\nExample: select 1"
            }
            Self::Home => "home: Goes back to the issue list.",
            Self::List => "list: Lists all issues.",
            Self::Find => {
                "find: Lists issues whose statement or description contains any KEYWORD.\n\
                 Parameters: KEYWORD [MORE_KEYWORDS]...\nExample: find java segmentation"
            }
            Self::FindTag => {
                "findtag: Lists issues holding any TAG.\n\
                 Parameters: TAG [MORE_TAGS]...\nExample: findtag java"
            }
            Self::Sort => {
                "sort: Sorts the displayed issues.\n\
                 Parameters: chrono | statement | tag | freq\nExample: sort freq"
            }
            Self::Star => {
                "star: Toggles the solution at INDEX of the selected issue as primary.\n\
                 Parameters: INDEX\nExample: star 2"
            }
            Self::AddTag => {
                "addtag: Adds tags to the issue at INDEX.\n\
                 Parameters: INDEX TAG [MORE_TAGS]...\nExample: addtag 1 java jvm"
            }
            Self::RefactorTag => {
                "refactortag: Renames OLD_TAG to NEW_TAG on every issue, or removes it.\n\
                 Parameters: OLD_TAG [NEW_TAG]\nExample: refactortag java jvm"
            }
            Self::Clear => "clear: Deletes every issue (asks for confirmation).",
            Self::Undo => "undo: Reverts the last change.",
            Self::Redo => "redo: Reapplies the last undone change.",
            Self::History => "history: Lists entered commands, most recent first.",
            Self::Help => "help: Shows this help.",
            Self::Exit => "exit: Exits the program.",
        }
    }
}

impl fmt::Display for CommandWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandWord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|word| word.as_str() == normalized)
            .ok_or_else(|| ParseError::UnknownCommand {
                word: s.trim().to_string(),
            })
    }
}

/// A validated command ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Issue),
    /// `add` without a statement: attach to the issue selected by the
    /// immediately preceding input.
    AddSolution(Solution),
    Edit {
        index: Index,
        statement: Option<Statement>,
        description: Option<String>,
    },
    Delete(Index),
    Select(Index),
    Home,
    List,
    Find(Vec<String>),
    FindTag(Vec<Tag>),
    Sort(IssueSort),
    Star(Index),
    AddTag {
        index: Index,
        tags: BTreeSet<Tag>,
    },
    RefactorTag {
        old: Tag,
        new: Option<Tag>,
    },
    Clear,
    Undo,
    Redo,
    History,
    Help,
    Exit,
}

/// Outcome of one input, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub feedback: String,
    pub exit: bool,
}

impl CommandResult {
    #[must_use]
    pub fn new(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            exit: false,
        }
    }

    fn exit(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            exit: true,
        }
    }
}

/// Read-only session facts a command may consult.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub inputs: &'a InputHistory,
    pub last_selected: Option<Index>,
}

impl CommandContext<'_> {
    /// Displayed index picked by the previous input, if it was a `select`.
    #[must_use]
    pub const fn last_selected_index(&self) -> Option<Index> {
        self.last_selected
    }
}

pub const MESSAGE_CLEAR_SUCCESS: &str = "SaveIt has been cleared!";
pub const MESSAGE_UNDO_SUCCESS: &str = "Undo success!";
pub const MESSAGE_REDO_SUCCESS: &str = "Redo success!";
pub const MESSAGE_LIST_SUCCESS: &str = "Listed all issues";
pub const MESSAGE_HOME_SUCCESS: &str = "Back to the issue list";
pub const MESSAGE_EXIT: &str = "Exiting SaveIt as requested ...";
pub const MESSAGE_NO_HISTORY: &str = "You have not yet entered any commands.";
pub const MESSAGE_HISTORY_HEADER: &str = "Entered commands (from most recent to earliest):";

impl Command {
    #[must_use]
    pub const fn word(&self) -> CommandWord {
        match self {
            Self::Add(_) | Self::AddSolution(_) => CommandWord::Add,
            Self::Edit { .. } => CommandWord::Edit,
            Self::Delete(_) => CommandWord::Delete,
            Self::Select(_) => CommandWord::Select,
            Self::Home => CommandWord::Home,
            Self::List => CommandWord::List,
            Self::Find(_) => CommandWord::Find,
            Self::FindTag(_) => CommandWord::FindTag,
            Self::Sort(_) => CommandWord::Sort,
            Self::Star(_) => CommandWord::Star,
            Self::AddTag { .. } => CommandWord::AddTag,
            Self::RefactorTag { .. } => CommandWord::RefactorTag,
            Self::Clear => CommandWord::Clear,
            Self::Undo => CommandWord::Undo,
            Self::Redo => CommandWord::Redo,
            Self::History => CommandWord::History,
            Self::Help => CommandWord::Help,
            Self::Exit => CommandWord::Exit,
        }
    }

    /// Destructive commands only run after explicit confirmation.
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// Run against `model`.
    ///
    /// # Errors
    ///
    /// [`CommandError`] for semantic failures; the model is left as it was.
    pub fn execute(
        &self,
        model: &mut ModelManager,
        ctx: CommandContext<'_>,
    ) -> Result<CommandResult, CommandError> {
        match self {
            Self::Add(issue) => {
                model.add_issue(issue.clone())?;
                model.commit();
                Ok(CommandResult::new(format!("New issue added: {issue}")))
            }
            Self::AddSolution(solution) => {
                let displayed = ctx.last_selected_index().ok_or(CommandError::NoIssueSelected {
                    action: "adding solution",
                })?;
                let (position, _) = model.displayed_issue(displayed)?;
                model.add_solution(position, solution.clone())?;
                model.commit();
                Ok(CommandResult::new(format!("New solution added: {solution}")))
            }
            Self::Edit {
                index,
                statement,
                description,
            } => {
                let target = model.displayed_issue(*index)?.1.clone();
                let edited = target.edited(statement.clone(), description.clone());
                model.update_issue(&target, edited.clone())?;
                model.commit();
                Ok(CommandResult::new(format!("Edited issue: {edited}")))
            }
            Self::Delete(index) => {
                let target = model.displayed_issue(*index)?.1.clone();
                model.delete_issue(&target)?;
                model.commit();
                Ok(CommandResult::new(format!("Deleted issue: {target}")))
            }
            Self::Select(index) => {
                model.select(*index)?;
                Ok(CommandResult::new(format!("Selected issue: {index}")))
            }
            Self::Home => {
                model.go_home();
                Ok(CommandResult::new(MESSAGE_HOME_SUCCESS))
            }
            Self::List => {
                model.update_filter(IssueFilter::All);
                Ok(CommandResult::new(MESSAGE_LIST_SUCCESS))
            }
            Self::Find(keywords) => {
                model.filter_issues(IssueFilter::Keywords(keywords.clone()));
                Ok(listed(model))
            }
            Self::FindTag(tags) => {
                model.filter_issues(IssueFilter::Tags(tags.clone()));
                Ok(listed(model))
            }
            Self::Sort(sort) => {
                model.sort_issues(*sort);
                Ok(CommandResult::new(format!("Sorted issues by {sort}")))
            }
            Self::Star(index) => star(model, *index),
            Self::AddTag { index, tags } => {
                let (position, _) = model.displayed_issue(*index)?;
                model.add_tag(position, tags)?;
                model.commit();
                let names: Vec<&str> = tags.iter().map(Tag::name).collect();
                Ok(CommandResult::new(format!(
                    "Added tags [{}] to issue {index}",
                    names.join(", ")
                )))
            }
            Self::RefactorTag { old, new } => {
                if !model.refactor_tag(old, new.as_ref()) {
                    return Ok(CommandResult::new(format!("No issue has the tag {old}")));
                }
                model.commit();
                Ok(CommandResult::new(match new {
                    Some(new) => format!("Tag refactored: {old} -> {new}"),
                    None => format!("Tag removed: {old}"),
                }))
            }
            Self::Clear => {
                model.reset_data(SaveIt::new());
                Ok(CommandResult::new(MESSAGE_CLEAR_SUCCESS))
            }
            Self::Undo => {
                model.undo()?;
                Ok(CommandResult::new(MESSAGE_UNDO_SUCCESS))
            }
            Self::Redo => {
                model.redo()?;
                Ok(CommandResult::new(MESSAGE_REDO_SUCCESS))
            }
            Self::History => Ok(history(ctx.inputs)),
            Self::Help => Ok(CommandResult::new(help())),
            Self::Exit => Ok(CommandResult::exit(MESSAGE_EXIT)),
        }
    }
}

fn listed(model: &ModelManager) -> CommandResult {
    CommandResult::new(format!("{} issues listed!", model.sorted_issues().len()))
}

/// `displayed` addresses the primary-first solution list of the selected issue.
fn star(model: &mut ModelManager, displayed: Index) -> Result<CommandResult, CommandError> {
    let (position, issue) = model.selected_issue().ok_or(CommandError::NoIssueSelected {
        action: "starring a solution",
    })?;
    let ordered = ordered_solutions(issue);
    let Some(&(solution, _)) = ordered.get(displayed.zero_based()) else {
        return Err(SaveItError::IndexOutOfRange {
            index: displayed.one_based(),
            len: ordered.len(),
        }
        .into());
    };
    model.set_primary_solution(position, solution)?;
    model.commit();

    let now_primary = model
        .selected_issue()
        .and_then(|(_, issue)| issue.solutions().get(solution.zero_based()))
        .is_some_and(Solution::is_primary);
    Ok(CommandResult::new(if now_primary {
        format!("Solution {displayed} is now the primary solution")
    } else {
        format!("Solution {displayed} is no longer the primary solution")
    }))
}

fn history(inputs: &InputHistory) -> CommandResult {
    if inputs.is_empty() {
        return CommandResult::new(MESSAGE_NO_HISTORY);
    }
    CommandResult::new(format!(
        "{MESSAGE_HISTORY_HEADER}\n{}",
        inputs.recent_first().join("\n")
    ))
}

fn help() -> String {
    CommandWord::ALL
        .iter()
        .map(|word| word.usage())
        .collect::<Vec<_>>()
        .join("\n\n")
}
