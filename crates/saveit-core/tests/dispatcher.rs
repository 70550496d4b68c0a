//! End-to-end dispatcher scenarios: raw input in, collection state out.

use saveit_core::collection::SaveIt;
use saveit_core::command::{Command, CommandWord};
use saveit_core::error::{CommandError, ErrorCode, LogicError, ParseError};
use saveit_core::input_history::InputHistory;
use saveit_core::logic::{CommandParser, LogicManager, Storage};
use saveit_core::manager::ModelManager;
use saveit_core::model::{Index, Issue, Solution, Statement, Tag};
use saveit_core::view::IssueSort;
use std::cell::RefCell;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Whitespace-split parser: `-x value` flags, one word per value.
struct TestParser;

impl TestParser {
    fn flag<'a>(args: &'a [&str], name: &str) -> Vec<&'a str> {
        args.windows(2)
            .filter(|pair| pair[0] == name)
            .map(|pair| pair[1])
            .collect()
    }

    fn index(arg: Option<&&str>, word: CommandWord) -> Result<Index, ParseError> {
        arg.and_then(|a| a.parse().ok())
            .and_then(Index::from_one_based)
            .ok_or_else(|| invalid(word))
    }
}

fn invalid(word: CommandWord) -> ParseError {
    ParseError::InvalidCommandFormat {
        usage: word.usage().to_string(),
    }
}

impl CommandParser for TestParser {
    fn parse(&self, input: &str) -> Result<Command, ParseError> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let word: CommandWord = parts.first().copied().unwrap_or_default().parse()?;
        let args = &parts[1..];
        let tags = |values: &[&str]| -> Result<Vec<Tag>, ParseError> {
            values
                .iter()
                .map(|v| Tag::new(*v).map_err(|_| invalid(word)))
                .collect()
        };
        match word {
            CommandWord::Add => {
                let links = Self::flag(args, "-l");
                let remarks = Self::flag(args, "-r");
                let solutions: Vec<Solution> = links
                    .iter()
                    .zip(remarks.iter().chain(std::iter::repeat(&"")))
                    .map(|(l, r)| Solution::new(*l, *r).map_err(|_| invalid(word)))
                    .collect::<Result<_, _>>()?;
                match Self::flag(args, "-s").first() {
                    Some(statement) => {
                        let statement = Statement::new(*statement).map_err(|_| invalid(word))?;
                        let description = Self::flag(args, "-d").join(" ");
                        let issue = Issue::new(
                            statement,
                            description,
                            solutions,
                            tags(&Self::flag(args, "-t"))?,
                        )
                        .map_err(|_| invalid(word))?;
                        Ok(Command::Add(issue))
                    }
                    None => solutions
                        .into_iter()
                        .next()
                        .map(Command::AddSolution)
                        .ok_or_else(|| invalid(word)),
                }
            }
            CommandWord::Select => Self::index(args.first(), word).map(Command::Select),
            CommandWord::Star => Self::index(args.first(), word).map(Command::Star),
            CommandWord::Delete => Self::index(args.first(), word).map(Command::Delete),
            CommandWord::FindTag => Ok(Command::FindTag(tags(args)?)),
            CommandWord::Find => Ok(Command::Find(args.iter().map(ToString::to_string).collect())),
            CommandWord::Sort => args
                .first()
                .and_then(|s| s.parse::<IssueSort>().ok())
                .map(Command::Sort)
                .ok_or_else(|| invalid(word)),
            CommandWord::AddTag => Ok(Command::AddTag {
                index: Self::index(args.first(), word)?,
                tags: tags(args.get(1..).unwrap_or_default())?
                    .into_iter()
                    .collect::<BTreeSet<_>>(),
            }),
            CommandWord::RefactorTag => {
                let mut parsed = tags(args)?.into_iter();
                let old = parsed.next().ok_or_else(|| invalid(word))?;
                Ok(Command::RefactorTag {
                    old,
                    new: parsed.next(),
                })
            }
            CommandWord::Home => Ok(Command::Home),
            CommandWord::List => Ok(Command::List),
            CommandWord::Clear => Ok(Command::Clear),
            CommandWord::Undo => Ok(Command::Undo),
            CommandWord::Redo => Ok(Command::Redo),
            CommandWord::History => Ok(Command::History),
            CommandWord::Help => Ok(Command::Help),
            CommandWord::Exit => Ok(Command::Exit),
            CommandWord::Edit => Err(invalid(word)),
        }
    }
}

/// Keeps every saved collection.
#[derive(Default)]
struct RecordingStorage {
    saved: RefCell<Vec<SaveIt>>,
}

impl Storage for &RecordingStorage {
    fn save_save_it(&self, save_it: &SaveIt) -> anyhow::Result<()> {
        self.saved.borrow_mut().push(save_it.clone());
        Ok(())
    }
}

fn session(storage: &RecordingStorage) -> LogicManager<TestParser, &RecordingStorage> {
    LogicManager::new(
        TestParser,
        storage,
        ModelManager::default(),
        InputHistory::default(),
    )
}

fn run(logic: &mut LogicManager<TestParser, &RecordingStorage>, inputs: &[&str]) {
    for input in inputs {
        logic
            .execute(input)
            .unwrap_or_else(|err| panic!("`{input}` failed: {err}"));
    }
}

fn statements(logic: &LogicManager<TestParser, &RecordingStorage>) -> Vec<String> {
    logic
        .sorted_issues()
        .iter()
        .map(|issue| issue.statement().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn undo_and_redo_walk_the_add_history() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(&mut logic, &["add -s algorithm", "add -s network", "undo"]);
    assert_eq!(statements(&logic), vec!["algorithm"]);

    run(&mut logic, &["redo"]);
    assert_eq!(statements(&logic), vec!["algorithm", "network"]);

    let err = logic.execute("redo").expect_err("nothing to redo");
    assert_eq!(err.code(), ErrorCode::NoMoreToRedo);
    assert_eq!(storage.saved.borrow().len(), 4);
}

#[test]
fn duplicate_add_leaves_collection_and_cursor() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(&mut logic, &["add -s Segmentation"]);
    let before = logic.model().history().cursor();

    let err = logic.execute("add -s SEGMENTATION").expect_err("duplicate key");
    assert_eq!(err.code(), ErrorCode::DuplicateIssue);
    assert_eq!(logic.model().history().cursor(), before);
    assert_eq!(logic.model().save_it().len(), 1);
}

#[test]
fn solution_attaches_only_right_after_select() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(&mut logic, &["add -s npe", "select 1", "add -l https://a -r guide"]);
    let issue = &logic.model().save_it().issues()[0];
    assert_eq!(issue.solutions().len(), 1);
    assert_eq!(issue.solutions()[0].remark(), "guide");

    run(&mut logic, &["select 1", "home"]);
    let err = logic.execute("add -l https://b").expect_err("selection expired");
    assert!(matches!(
        err,
        LogicError::Command(CommandError::NoIssueSelected { .. })
    ));
    assert_eq!(logic.model().save_it().issues()[0].solutions().len(), 1);
}

#[test]
fn starring_moves_the_primary_flag() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(
        &mut logic,
        &["add -s npe -l https://a -l https://b", "select 1", "star 1", "star 2"],
    );
    let flags: Vec<bool> = logic.model().save_it().issues()[0]
        .solutions()
        .iter()
        .map(Solution::is_primary)
        .collect();
    assert_eq!(flags, vec![false, true]);

    let shown: Vec<&str> = logic
        .selected_solutions()
        .expect("selected")
        .into_iter()
        .map(|(_, s)| s.link())
        .collect();
    assert_eq!(shown, vec!["https://b", "https://a"]);
}

#[test]
fn refactor_tag_renames_and_deduplicates() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(
        &mut logic,
        &[
            "add -s one -t java",
            "add -s two -t java -t jvm",
            "add -s three -t JAVA",
            "add -s four -t rust",
            "refactortag java jvm",
        ],
    );
    let java = Tag::new("java").expect("valid");
    let jvm = Tag::new("jvm").expect("valid");
    let issues = logic.model().save_it().issues();
    assert_eq!(issues.iter().filter(|i| i.has_tag(&jvm)).count(), 3);
    assert_eq!(issues.iter().filter(|i| i.has_tag(&java)).count(), 0);
    assert_eq!(issues[1].tags().len(), 1);

    run(&mut logic, &["refactortag rust"]);
    assert!(!logic.current_tag_set().contains(&Tag::new("rust").expect("valid")));
}

#[test]
fn findtag_then_sort_by_frequency() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(
        &mut logic,
        &[
            "add -s one -t db",
            "add -s two -t net",
            "add -s three -t db",
            "findtag net",
            "findtag net",
            "findtag db",
            "list",
            "sort freq",
        ],
    );
    assert_eq!(statements(&logic), vec!["two", "one", "three"]);

    run(&mut logic, &["sort chrono", "find three"]);
    assert_eq!(statements(&logic), vec!["three"]);
}

#[test]
fn clear_confirmation_round_trip() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(&mut logic, &["add -s a", "clear", "no"]);
    assert_eq!(statements(&logic), vec!["a"]);

    run(&mut logic, &["clear", "yes"]);
    assert!(statements(&logic).is_empty());
    run(&mut logic, &["undo"]);
    assert_eq!(statements(&logic), vec!["a"]);

    assert_eq!(
        logic.input_history().recent_first(),
        vec!["undo", "yes", "clear", "no", "clear", "add -s a"]
    );
}

#[test]
fn padded_confirmation_does_not_clear() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(&mut logic, &["add -s a", "clear", "   yes\t"]);
    assert_eq!(statements(&logic), vec!["a"]);
    assert!(!logic.is_awaiting_confirmation());
    assert_eq!(storage.saved.borrow().len(), 1);
}

#[test]
fn re_added_statement_starts_with_no_accesses() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    run(
        &mut logic,
        &["add -s a", "add -s b", "find a", "find a", "list", "delete 1", "add -s A"],
    );
    let frequencies = logic.model().frequencies();
    let counts: Vec<u64> = logic
        .model()
        .save_it()
        .issues()
        .iter()
        .map(|issue| frequencies.get(issue))
        .collect();
    assert_eq!(counts, vec![0, 0]);

    run(&mut logic, &["sort freq"]);
    assert_eq!(statements(&logic), vec!["b", "A"]);
}

#[test]
fn history_command_sees_inputs_before_it() {
    let storage = RecordingStorage::default();
    let mut logic = session(&storage);
    logic.execute("bogus").expect_err("unknown word");
    let listed = logic.execute("history").expect("history").feedback;
    assert!(listed.ends_with("\nbogus"));
}
