//! REPL line parser.
//!
//! A line is split shell-style (so `-s "null pointer"` is one value), the first
//! word picks the [`CommandWord`], and the rest is parsed by a clap multicall
//! command named after that word.

use clap::{Args, Parser, Subcommand};
use saveit_core::command::{Command, CommandWord};
use saveit_core::error::{ParseError, SaveItError};
use saveit_core::logic::CommandParser;
use saveit_core::model::{Index, Issue, Solution, Statement, Tag};
use saveit_core::view::IssueSort;

#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
struct Line {
    #[command(subcommand)]
    word: Word,
}

#[derive(Subcommand, Debug)]
enum Word {
    Add(AddArgs),
    Edit(EditArgs),
    Delete {
        #[arg(value_parser = parse_index)]
        index: Index,
    },
    Select {
        #[arg(value_parser = parse_index)]
        index: Index,
    },
    Home,
    List,
    Find {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    #[command(name = "findtag")]
    FindTag {
        #[arg(required = true)]
        tags: Vec<Tag>,
    },
    Sort {
        by: IssueSort,
    },
    Star {
        #[arg(value_parser = parse_index)]
        index: Index,
    },
    #[command(name = "addtag")]
    AddTag {
        #[arg(value_parser = parse_index)]
        index: Index,
        #[arg(required = true)]
        tags: Vec<Tag>,
    },
    #[command(name = "refactortag")]
    RefactorTag { old: Tag, new: Option<Tag> },
    Clear,
    Undo,
    Redo,
    History,
    Help,
    Exit,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(short = 's')]
    statement: Option<String>,
    #[arg(short = 'd')]
    description: Option<String>,
    #[arg(short = 'l')]
    links: Vec<String>,
    #[arg(short = 'r')]
    remarks: Vec<String>,
    #[arg(short = 't')]
    tags: Vec<Tag>,
}

#[derive(Args, Debug)]
struct EditArgs {
    #[arg(value_parser = parse_index)]
    index: Index,
    #[arg(short = 's')]
    statement: Option<String>,
    #[arg(short = 'd')]
    description: Option<String>,
}

fn parse_index(raw: &str) -> Result<Index, String> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(Index::from_one_based)
        .ok_or_else(|| format!("'{raw}' is not a positive index"))
}

/// Parses REPL lines into [`Command`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplParser;

impl CommandParser for ReplParser {
    fn parse(&self, input: &str) -> Result<Command, ParseError> {
        let first = input.split_whitespace().next().unwrap_or_default();
        let word: CommandWord = first.parse()?;
        let invalid = |detail: Option<String>| ParseError::InvalidCommandFormat {
            usage: match detail {
                Some(detail) => format!("{detail}\n{}", word.usage()),
                None => word.usage().to_string(),
            },
        };

        let tokens = shell_words::split(input).map_err(|err| invalid(Some(err.to_string())))?;
        let argv = std::iter::once(word.as_str().to_string()).chain(tokens.into_iter().skip(1));
        let line = Line::try_parse_from(argv).map_err(|_| invalid(None))?;

        into_command(line.word).map_err(|err| match err {
            Rejected::Format => invalid(None),
            Rejected::Value(err) => invalid(Some(err.to_string())),
        })
    }
}

enum Rejected {
    Format,
    Value(SaveItError),
}

impl From<SaveItError> for Rejected {
    fn from(err: SaveItError) -> Self {
        Self::Value(err)
    }
}

fn into_command(word: Word) -> Result<Command, Rejected> {
    Ok(match word {
        Word::Add(args) => add(args)?,
        Word::Edit(EditArgs {
            index,
            statement,
            description,
        }) => {
            if statement.is_none() && description.is_none() {
                return Err(Rejected::Format);
            }
            Command::Edit {
                index,
                statement: statement.map(Statement::new).transpose()?,
                description,
            }
        }
        Word::Delete { index } => Command::Delete(index),
        Word::Select { index } => Command::Select(index),
        Word::Home => Command::Home,
        Word::List => Command::List,
        Word::Find { keywords } => Command::Find(keywords),
        Word::FindTag { tags } => Command::FindTag(tags),
        Word::Sort { by } => Command::Sort(by),
        Word::Star { index } => Command::Star(index),
        Word::AddTag { index, tags } => Command::AddTag {
            index,
            tags: tags.into_iter().collect(),
        },
        Word::RefactorTag { old, new } => Command::RefactorTag { old, new },
        Word::Clear => Command::Clear,
        Word::Undo => Command::Undo,
        Word::Redo => Command::Redo,
        Word::History => Command::History,
        Word::Help => Command::Help,
        Word::Exit => Command::Exit,
    })
}

/// `-s` present: a new issue. Otherwise exactly one `-l`/`-r` pair for the
/// issue selected just before.
fn add(args: AddArgs) -> Result<Command, Rejected> {
    if args.links.len() != args.remarks.len() {
        return Err(Rejected::Format);
    }
    let mut solutions = args
        .links
        .into_iter()
        .zip(args.remarks)
        .map(|(link, remark)| Solution::new(link, remark))
        .collect::<Result<Vec<_>, _>>()?;

    match (args.statement, args.description) {
        (Some(statement), Some(description)) => Ok(Command::Add(Issue::new(
            Statement::new(statement)?,
            description,
            solutions,
            args.tags,
        )?)),
        (None, None) if solutions.len() == 1 && args.tags.is_empty() => {
            Ok(Command::AddSolution(solutions.remove(0)))
        }
        _ => Err(Rejected::Format),
    }
}
