//! Tab completion for the interactive prompt.
//!
//! The first word completes to a command word. After that, candidates depend
//! on the command: tags for `findtag`, `addtag`, `refactortag` and `-t`,
//! statements after `-s`, and statement words for `find`.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use saveit_core::command::CommandWord;
use saveit_core::logic::{CommandParser, LogicManager, Storage};
use std::collections::BTreeSet;

/// Completion candidates taken from the session before each prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionData {
    commands: Vec<String>,
    tags: Vec<String>,
    statements: Vec<String>,
    keywords: Vec<String>,
}

impl CompletionData {
    #[must_use]
    pub fn capture<P: CommandParser, S: Storage>(logic: &LogicManager<P, S>) -> Self {
        let statements: Vec<String> = logic
            .model()
            .current_statements()
            .into_iter()
            .map(str::to_string)
            .collect();
        let keywords: BTreeSet<String> = statements
            .iter()
            .flat_map(|statement| statement.split_whitespace())
            .map(str::to_lowercase)
            .collect();

        Self {
            commands: CommandWord::ALL
                .iter()
                .map(|word| word.as_str().to_string())
                .collect(),
            tags: logic
                .current_tag_set()
                .iter()
                .map(|tag| tag.name().to_string())
                .collect(),
            statements,
            keywords: keywords.into_iter().collect(),
        }
    }

    /// Start of the word under the cursor and the candidates to replace it.
    #[must_use]
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let head = line.get(..pos).unwrap_or(line);
        let start = head
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let word = &head[start..];
        let before: Vec<&str> = head[..start].split_whitespace().collect();

        let Some(first) = before.first() else {
            return (start, matching(&self.commands, word, false));
        };

        match (first.parse::<CommandWord>(), before.last()) {
            (_, Some(&"-s")) => (start, matching(&self.statements, word, true)),
            (_, Some(&"-t")) | (Ok(CommandWord::FindTag | CommandWord::RefactorTag), _) => {
                (start, matching(&self.tags, word, false))
            }
            // The first argument of `addtag` is an index.
            (Ok(CommandWord::AddTag), _) if before.len() >= 2 => {
                (start, matching(&self.tags, word, false))
            }
            (Ok(CommandWord::Find), _) => (start, matching(&self.keywords, word, false)),
            _ => (start, Vec::new()),
        }
    }
}

fn matching(items: &[String], word: &str, quote: bool) -> Vec<Pair> {
    let prefix = word.trim_start_matches(['"', '\'']).to_lowercase();
    items
        .iter()
        .filter(|item| item.to_lowercase().starts_with(&prefix))
        .map(|item| Pair {
            display: item.clone(),
            replacement: if quote {
                shell_words::quote(item).into_owned()
            } else {
                item.clone()
            },
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct ReplHelper {
    data: CompletionData,
}

impl ReplHelper {
    pub fn refresh(&mut self, data: CompletionData) {
        self.data = data;
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.data.candidates(line, pos))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ReplParser;
    use crate::storage::JsonFileStorage;
    use saveit_core::input_history::InputHistory;
    use saveit_core::manager::ModelManager;

    fn data() -> CompletionData {
        CompletionData {
            commands: CommandWord::ALL
                .iter()
                .map(|word| word.as_str().to_string())
                .collect(),
            tags: vec!["java".into(), "jvm".into(), "rust".into()],
            statements: vec!["null pointer".into(), "segfault".into()],
            keywords: vec!["null".into(), "pointer".into(), "segfault".into()],
        }
    }

    fn complete(line: &str) -> (usize, Vec<String>) {
        let (start, pairs) = data().candidates(line, line.len());
        (start, pairs.into_iter().map(|p| p.replacement).collect())
    }

    #[test]
    fn first_word_completes_commands() {
        assert_eq!(complete("fi"), (0, vec!["find".into(), "findtag".into()]));
        assert_eq!(complete("RED"), (0, vec!["redo".into()]));
    }

    #[test]
    fn tag_positions_complete_tags() {
        assert_eq!(complete("findtag j"), (8, vec!["java".into(), "jvm".into()]));
        assert_eq!(complete("refactortag java j").1, vec!["java", "jvm"]);
        assert_eq!(complete("add -s a -d b -t r").1, vec!["rust"]);
        assert!(complete("addtag j").1.is_empty());
        assert_eq!(complete("addtag 1 r").1, vec!["rust"]);
    }

    #[test]
    fn statements_are_quoted_after_s() {
        assert_eq!(complete("edit 1 -s nu"), (10, vec!["'null pointer'".into()]));
        assert_eq!(complete("edit 1 -s \"se").1, vec!["segfault"]);
    }

    #[test]
    fn find_completes_statement_words() {
        assert_eq!(complete("find po").1, vec!["pointer"]);
        assert!(complete("delete ").1.is_empty());
    }

    #[test]
    fn capture_reads_tags_and_statements_from_the_session() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut session = LogicManager::new(
            ReplParser,
            JsonFileStorage::new(dir.path().join("kb.json")),
            ModelManager::default(),
            InputHistory::default(),
        );
        session
            .execute(r#"add -s "Null Pointer" -d crash -t Java"#)
            .expect("add");

        let captured = CompletionData::capture(&session);
        assert_eq!(captured.statements, vec!["Null Pointer"]);
        assert_eq!(captured.tags, vec!["Java"]);
        assert_eq!(captured.keywords, vec!["null", "pointer"]);
        assert_eq!(captured.commands.len(), CommandWord::ALL.len());
    }
}
