use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnknownCommand,
    InvalidCommandFormat,
    DuplicateIssue,
    IssueNotFound,
    IndexOutOfRange,
    NoIssueSelected,
    MultiplePrimarySolutions,
    InvalidValue,
    NoMoreToUndo,
    NoMoreToRedo,
    ConfigParseError,
    StorageWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnknownCommand => "E1001",
            Self::InvalidCommandFormat => "E1002",
            Self::DuplicateIssue => "E2001",
            Self::IssueNotFound => "E2002",
            Self::IndexOutOfRange => "E2003",
            Self::NoIssueSelected => "E2004",
            Self::MultiplePrimarySolutions => "E2005",
            Self::InvalidValue => "E2006",
            Self::NoMoreToUndo => "E3001",
            Self::NoMoreToRedo => "E3002",
            Self::ConfigParseError => "E4001",
            Self::StorageWriteFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnknownCommand => "Unknown command",
            Self::InvalidCommandFormat => "Invalid command format",
            Self::DuplicateIssue => "Issue already exists",
            Self::IssueNotFound => "Issue not found",
            Self::IndexOutOfRange => "Index out of range",
            Self::NoIssueSelected => "No issue selected",
            Self::MultiplePrimarySolutions => "More than one primary solution",
            Self::InvalidValue => "Invalid value",
            Self::NoMoreToUndo => "Nothing to undo",
            Self::NoMoreToRedo => "Nothing to redo",
            Self::ConfigParseError => "Config file parse error",
            Self::StorageWriteFailed => "Data file write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::UnknownCommand => Some("Type `help` to see the available commands."),
            Self::InvalidCommandFormat => Some("Check the usage line printed with the error."),
            Self::DuplicateIssue => Some("Edit the existing issue or choose another statement."),
            Self::IndexOutOfRange => Some("Use an index from the currently displayed list."),
            Self::NoIssueSelected => Some("Run `select INDEX` first."),
            Self::MultiplePrimarySolutions => Some("Keep at most one solution starred per issue."),
            Self::NoMoreToUndo | Self::NoMoreToRedo | Self::IssueNotFound | Self::InvalidValue => {
                None
            }
            Self::ConfigParseError => Some("Fix syntax in saveit/config.toml and retry."),
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures of collection operations and domain value validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveItError {
    #[error("this issue already exists in the saveIt: {statement}")]
    DuplicateIssue { statement: String },

    #[error("issue not found: {statement}")]
    IssueNotFound { statement: String },

    /// `index` is one-based, as the user typed it.
    #[error("the index {index} is invalid, there are {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("issue '{statement}' has more than one primary solution")]
    MultiplePrimarySolutions { statement: String },

    #[error("invalid {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

impl SaveItError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateIssue { .. } => ErrorCode::DuplicateIssue,
            Self::IssueNotFound { .. } => ErrorCode::IssueNotFound,
            Self::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::MultiplePrimarySolutions { .. } => ErrorCode::MultiplePrimarySolutions,
            Self::InvalidValue { .. } => ErrorCode::InvalidValue,
        }
    }
}

/// Cursor movement failures of the snapshot history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("no more commands to undo")]
    NoMoreToUndo,
    #[error("no more commands to redo")]
    NoMoreToRedo,
}

impl HistoryError {
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::NoMoreToUndo => ErrorCode::NoMoreToUndo,
            Self::NoMoreToRedo => ErrorCode::NoMoreToRedo,
        }
    }
}

/// Raw input that could not be turned into a [`crate::command::Command`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {word}")]
    UnknownCommand { word: String },

    #[error("invalid command format!\n{usage}")]
    InvalidCommandFormat { usage: String },
}

impl ParseError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownCommand { .. } => ErrorCode::UnknownCommand,
            Self::InvalidCommandFormat { .. } => ErrorCode::InvalidCommandFormat,
        }
    }
}

/// Semantic failure while executing a well-formed command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    SaveIt(#[from] SaveItError),

    #[error(transparent)]
    History(#[from] HistoryError),

    /// `action` completes "issue has to be selected first before ...".
    #[error("issue has to be selected first before {action}")]
    NoIssueSelected { action: &'static str },
}

impl CommandError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::SaveIt(err) => err.code(),
            Self::History(err) => err.code(),
            Self::NoIssueSelected { .. } => ErrorCode::NoIssueSelected,
        }
    }
}

/// Everything the dispatcher can report back for one input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogicError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("could not save data to file: {0}")]
    Storage(String),
}

impl LogicError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(err) => err.code(),
            Self::Command(err) => err.code(),
            Self::Storage(_) => ErrorCode::StorageWriteFailed,
        }
    }

    /// Remediation hint for the error's code, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
