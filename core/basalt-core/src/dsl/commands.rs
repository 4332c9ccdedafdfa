//! The command table.
//!
//! Every command the language knows is a regular expression paired with a
//! command group; the table is compiled once at server startup and a line
//! of input is classified by the first pattern that matches it.

use regex::Regex;

/// Groups of commands that parse the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    CreateDb,
    CreateTable,
    CreateColumn,
    CreateIndex,
    Insert,
    SelectColumn,
    SelectPos,
    Fetch,
    ExtremeIndex,
    Extreme,
    Average,
    VectorOp,
    Tuple,
    Load,
    Shutdown,
}

/// Compiled command patterns, checked in declaration order.
#[derive(Debug)]
pub struct CommandSet {
    patterns: Vec<(Regex, CommandKind)>,
}

const NAME: &str = "[a-zA-Z0-9_.]+";
const BOUND: &str = "(-?[0-9]+|null)";

impl CommandSet {
    pub fn new() -> Self {
        let table: Vec<(String, CommandKind)> = vec![
            (
                r#"^create\(db,"[a-zA-Z0-9_]+"\)"#.to_string(),
                CommandKind::CreateDb,
            ),
            (
                format!(r#"^create\(tbl,"{NAME}",{NAME},[0-9]+\)"#),
                CommandKind::CreateTable,
            ),
            (
                format!(r#"^create\(col,"{NAME}",{NAME},(sorted|unsorted)\)"#),
                CommandKind::CreateColumn,
            ),
            (
                format!(r"^create\(idx,{NAME},(sorted|btree)\)"),
                CommandKind::CreateIndex,
            ),
            (r"^relational_insert\(".to_string(), CommandKind::Insert),
            (
                format!(r"^{NAME}=select\({NAME},{BOUND},{BOUND}\)"),
                CommandKind::SelectColumn,
            ),
            (
                format!(r"^{NAME}=select\({NAME},{NAME},{BOUND},{BOUND}\)"),
                CommandKind::SelectPos,
            ),
            (
                format!(r"^{NAME}=fetch\({NAME},{NAME}\)"),
                CommandKind::Fetch,
            ),
            (
                format!(r"^{NAME},{NAME}=(min|max)\({NAME},{NAME}\)"),
                CommandKind::ExtremeIndex,
            ),
            (
                format!(r"^{NAME}=(min|max)\({NAME}\)"),
                CommandKind::Extreme,
            ),
            (
                format!(r"^{NAME}=avg\({NAME}\)"),
                CommandKind::Average,
            ),
            (
                format!(r"^{NAME}=(add|sub)\({NAME},{NAME}\)"),
                CommandKind::VectorOp,
            ),
            (r"^tuple\(".to_string(), CommandKind::Tuple),
            (
                r#"^load\("[a-zA-Z0-9_./]+"\)"#.to_string(),
                CommandKind::Load,
            ),
            (r"^shutdown".to_string(), CommandKind::Shutdown),
        ];
        let patterns = table
            .into_iter()
            .map(|(p, k)| (Regex::new(&p).expect("command pattern compiles"), k))
            .collect();
        CommandSet { patterns }
    }

    /// First command group whose pattern matches the input line.
    pub fn classify(&self, line: &str) -> Option<CommandKind> {
        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(line))
            .map(|&(_, kind)| kind)
    }
}

impl Default for CommandSet {
    fn default() -> Self {
        CommandSet::new()
    }
}
