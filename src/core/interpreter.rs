// src/core/interpreter.rs

use crate::{
    core::{
        lister::{self, ListError},
        navigator::{self, NavigationError},
    },
    models::{CommandResult, Line},
    system::storage::Storage,
};
use anyhow::Result;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

// --- Command Definition and Registry ---

/// How a registry entry recognizes an input line.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// The whole line must equal this text.
    Exact(&'static str),
    /// The line must start with this text; the remainder is the argument.
    Prefix(&'static str),
}

impl Pattern {
    /// Returns the argument part of `line` when the pattern applies.
    fn match_line<'l>(&self, line: &'l str) -> Option<&'l str> {
        match self {
            Pattern::Exact(word) => (line == *word).then_some(""),
            Pattern::Prefix(prefix) => line.strip_prefix(prefix),
        }
    }
}

/// Everything a handler needs for one invocation.
struct Invocation<'a> {
    line: &'a str,
    argument: &'a str,
    current_path: &'a mut String,
    storage: &'a dyn Storage,
}

/// A built-in command: the pattern it answers to and its handler.
struct CommandDefinition {
    pattern: Pattern,
    handler: fn(Invocation<'_>) -> Result<CommandResult>,
}

/// The built-ins, in priority order. Prefixes overlap (`ls` vs `ls `), so the first match wins
/// and the order of this table is part of the command grammar.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        pattern: Pattern::Prefix("echo "),
        handler: handle_echo,
    },
    CommandDefinition {
        pattern: Pattern::Exact("man ls"),
        handler: handle_manual,
    },
    CommandDefinition {
        pattern: Pattern::Exact("ls"),
        handler: handle_list,
    },
    CommandDefinition {
        pattern: Pattern::Prefix("ls "),
        handler: handle_list,
    },
    CommandDefinition {
        pattern: Pattern::Exact("exit"),
        handler: handle_exit,
    },
    CommandDefinition {
        pattern: Pattern::Prefix("cd "),
        handler: handle_change_dir,
    },
];

/// Finds the first registry entry matching `line`, together with its argument.
fn find_command(line: &str) -> Option<(&'static CommandDefinition, &str)> {
    COMMAND_REGISTRY
        .iter()
        .find_map(|cmd| cmd.pattern.match_line(line).map(|arg| (cmd, arg)))
}

// --- Interpreter ---

/// Turns raw input lines into [`CommandResult`]s.
///
/// The interpreter holds no session state of its own; the caller passes the current path in
/// and observes `cd` through the same reference.
pub struct Interpreter {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter").finish_non_exhaustive()
    }
}

impl Interpreter {
    /// An interpreter answering `ls` and `cd` from `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The absolute directory a session asking for `requested` should start in.
    pub fn start_path(&self, requested: &str) -> String {
        navigator::resolve_start(self.storage.as_ref(), requested)
    }

    /// Runs one line. Never fails: an error or a panic inside a handler becomes a single
    /// error line, and the current path is left as it was.
    pub fn dispatch(&self, line: &str, current_path: &mut String) -> CommandResult {
        log::trace!("Dispatching {:?} at '{}'", line, current_path);
        let original_path = current_path.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(line, current_path)));
        let detail = match outcome {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => {
                log::warn!("Command {:?} failed unexpectedly: {:#}", line, e);
                format!("{:#}", e)
            }
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                log::error!("Command {:?} panicked: {}", line, detail);
                *current_path = original_path;
                detail
            }
        };
        CommandResult::error(format!(t!("command.error.execution"), detail = detail))
    }

    fn execute(&self, line: &str, current_path: &mut String) -> Result<CommandResult> {
        match find_command(line) {
            Some((command, argument)) => (command.handler)(Invocation {
                line,
                argument,
                current_path,
                storage: self.storage.as_ref(),
            }),
            None => {
                log::debug!("Unknown command: {:?}", line);
                Ok(CommandResult::error(format!(t!("command.unknown"), line = line)))
            }
        }
    }
}

/// The message carried by a panic payload, when it has one.
pub(crate) fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// --- Handlers ---

fn handle_echo(inv: Invocation<'_>) -> Result<CommandResult> {
    Ok(CommandResult::plain(inv.argument))
}

fn handle_manual(_inv: Invocation<'_>) -> Result<CommandResult> {
    Ok(CommandResult::lines(
        t!("command.man.ls").lines().map(Line::plain).collect(),
    ))
}

fn handle_exit(_inv: Invocation<'_>) -> Result<CommandResult> {
    Ok(CommandResult::terminate())
}

fn handle_list(inv: Invocation<'_>) -> Result<CommandResult> {
    let requested = inv.argument.trim();
    let target = if requested.is_empty() {
        inv.current_path.clone()
    } else {
        match inv.storage.resolve_absolute(inv.current_path, requested) {
            Ok(path) => path,
            Err(e) => {
                return Ok(CommandResult::error(format!(t!("command.ls.error"), error = e)));
            }
        }
    };

    let result = match lister::list(inv.storage, &target) {
        Ok(entries) => {
            let mut lines = Vec::with_capacity(entries.len() + 1);
            lines.push(Line::info(format!(t!("command.ls.header"), path = target)));
            lines.extend(
                entries
                    .iter()
                    .map(|entry| Line::plain(format!("{} {}", entry.kind.tag(), entry.name))),
            );
            CommandResult::lines(lines)
        }
        Err(ListError::NotFound(path)) => {
            CommandResult::error(format!(t!("command.ls.not_found"), path = path))
        }
        Err(ListError::NotADirectory(path)) => {
            CommandResult::error(format!(t!("command.ls.not_a_directory"), path = path))
        }
        Err(ListError::Storage(e)) => {
            CommandResult::error(format!(t!("command.ls.error"), error = e))
        }
    };
    Ok(result)
}

fn handle_change_dir(inv: Invocation<'_>) -> Result<CommandResult> {
    let token = inv.argument;
    let result = match navigator::resolve(inv.storage, inv.current_path, token) {
        Ok(new_path) => {
            log::debug!("Current path: '{}' -> '{}'", inv.current_path, new_path);
            *inv.current_path = new_path;
            CommandResult::plain(format!(t!("command.cd.changed"), path = inv.current_path))
        }
        Err(NavigationError::InvalidCharacter) => {
            CommandResult::error(t!("command.cd.invalid_character"))
        }
        Err(NavigationError::NotFound(token)) => {
            CommandResult::error(format!(t!("command.cd.not_found"), token = token))
        }
        Err(NavigationError::Storage(e)) => {
            log::debug!("Storage failure while changing to {:?} from {:?}", token, inv.line);
            CommandResult::error(format!(t!("command.cd.error"), error = e))
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{DEFAULT_START_PATH, ROOT_PATH},
        models::LineKind,
        system::{memory_storage::MemoryStorage, storage::StorageError},
    };

    fn interpreter() -> Interpreter {
        let mut storage = MemoryStorage::with_default_tree();
        storage.add_file("C:\\Users\\owner\\Documents\\cv.pdf").unwrap();
        Interpreter::new(Arc::new(storage))
    }

    fn texts(result: &CommandResult) -> Vec<&str> {
        result.output_lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// A storage whose every listing fails, to exercise the error paths.
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn exists(&self, _path: &str) -> bool {
            true
        }
        fn is_dir(&self, _path: &str) -> bool {
            true
        }
        fn is_file(&self, _path: &str) -> bool {
            false
        }
        fn list_entries(&self, _path: &str) -> Result<Vec<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk on fire")))
        }
        fn resolve_absolute(&self, _base: &str, _token: &str) -> Result<String, StorageError> {
            Err(StorageError::Io(std::io::Error::other("cannot resolve")))
        }
    }

    /// A storage that blows up on the first existence check.
    struct PanickingStorage;

    impl Storage for PanickingStorage {
        fn exists(&self, _path: &str) -> bool {
            panic!("storage exploded");
        }
        fn is_dir(&self, _path: &str) -> bool {
            true
        }
        fn is_file(&self, _path: &str) -> bool {
            false
        }
        fn list_entries(&self, _path: &str) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
        fn resolve_absolute(&self, base: &str, token: &str) -> Result<String, StorageError> {
            Ok(format!("{}\\{}", base, token))
        }
    }

    #[test]
    fn test_echo_returns_remainder_verbatim() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("echo hello world", &mut path);
        assert_eq!(result.output_lines, vec![Line::plain("hello world")]);
        assert!(!result.terminate);

        let spaced = interpreter().dispatch("echo   padded ", &mut path);
        assert_eq!(texts(&spaced), vec!["  padded "]);
    }

    #[test]
    fn test_echo_without_space_is_unknown() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("echo", &mut path);
        assert_eq!(texts(&result), vec!["Unknown command >>: echo"]);
    }

    #[test]
    fn test_manual_is_multi_line() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("man ls", &mut path);
        assert_eq!(result.output_lines.len(), 6);
        assert!(result.output_lines.iter().all(|l| l.kind == LineKind::Plain));
        assert!(texts(&result)[0].contains("man ls"));
    }

    #[test]
    fn test_ls_current_path_lists_header_and_entries() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("ls", &mut path);
        assert_eq!(
            texts(&result),
            vec![
                ">> Directory contents of C:\\Users\\owner:",
                "[DIR] Desktop",
                "[DIR] Documents",
                "[DIR] Music",
                "[DIR] Videos",
            ]
        );
        assert_eq!(result.output_lines[0].kind, LineKind::Info);
    }

    #[test]
    fn test_ls_dir_and_file_in_enumeration_order() {
        let mut storage = MemoryStorage::new();
        storage.add_dir("C:\\box\\a").unwrap();
        storage.add_file("C:\\box\\b").unwrap();
        let interpreter = Interpreter::new(Arc::new(storage));

        let mut path = "C:\\box".to_string();
        let result = interpreter.dispatch("ls", &mut path);
        assert_eq!(
            texts(&result),
            vec![">> Directory contents of C:\\box:", "[DIR] a", "[FILE] b"]
        );
    }

    #[test]
    fn test_ls_with_argument_resolves_against_current_path() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("ls   Documents  ", &mut path);
        assert_eq!(
            texts(&result),
            vec![
                ">> Directory contents of C:\\Users\\owner\\Documents:",
                "[FILE] cv.pdf",
            ]
        );
        assert_eq!(path, DEFAULT_START_PATH);
    }

    #[test]
    fn test_ls_blank_argument_lists_current_path() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("ls    ", &mut path);
        assert_eq!(texts(&result)[0], ">> Directory contents of C:\\Users\\owner:");
    }

    #[test]
    fn test_ls_failures_are_error_lines() {
        let mut path = DEFAULT_START_PATH.to_string();
        let missing = interpreter().dispatch("ls Pictures", &mut path);
        assert_eq!(
            missing.output_lines,
            vec![Line::error("Path not found: C:\\Users\\owner\\Pictures")]
        );

        let file = interpreter().dispatch("ls Documents\\cv.pdf", &mut path);
        assert_eq!(
            texts(&file),
            vec!["Not a directory: C:\\Users\\owner\\Documents\\cv.pdf"]
        );
    }

    #[test]
    fn test_storage_failures_become_error_lines() {
        let interpreter = Interpreter::new(Arc::new(BrokenStorage));
        let mut path = DEFAULT_START_PATH.to_string();

        let listed = interpreter.dispatch("ls", &mut path);
        assert_eq!(
            listed.output_lines,
            vec![Line::error("Error listing directory: disk on fire")]
        );

        let changed = interpreter.dispatch("cd somewhere", &mut path);
        assert_eq!(
            changed.output_lines,
            vec![Line::error("Error changing directory: cannot resolve")]
        );
        assert_eq!(path, DEFAULT_START_PATH);
    }

    #[test]
    fn test_exit_terminates_without_output() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("exit", &mut path);
        assert!(result.terminate);
        assert!(result.output_lines.is_empty());

        let not_exit = interpreter().dispatch("exit now", &mut path);
        assert!(!not_exit.terminate);
    }

    #[test]
    fn test_cd_success_mutates_path() {
        let interpreter = interpreter();
        let mut path = DEFAULT_START_PATH.to_string();

        let result = interpreter.dispatch("cd Music", &mut path);
        assert_eq!(path, "C:\\Users\\owner\\Music");
        assert_eq!(
            result.output_lines,
            vec![Line::plain("Changed path to: C:\\Users\\owner\\Music")]
        );

        interpreter.dispatch("cd ..", &mut path);
        interpreter.dispatch("cd ..", &mut path);
        let result = interpreter.dispatch("cd ..", &mut path);
        assert_eq!(path, ROOT_PATH);
        assert_eq!(texts(&result), vec!["Changed path to: C:\\"]);
    }

    #[test]
    fn test_cd_rejections_leave_path_unchanged() {
        let interpreter = interpreter();
        let mut path = DEFAULT_START_PATH.to_string();

        let slash = interpreter.dispatch("cd Documents/", &mut path);
        assert_eq!(
            slash.output_lines,
            vec![Line::error("'/' is not a valid character when changing the path")]
        );

        let missing = interpreter.dispatch("cd Pictures", &mut path);
        assert_eq!(texts(&missing), vec!["Directory not found: Pictures"]);
        assert_eq!(missing.output_lines[0].kind, LineKind::Error);
        assert_eq!(path, DEFAULT_START_PATH);
    }

    #[test]
    fn test_unknown_command_is_reported_verbatim() {
        let mut path = DEFAULT_START_PATH.to_string();
        let result = interpreter().dispatch("foo bar", &mut path);
        assert_eq!(
            result.output_lines,
            vec![Line::error("Unknown command >>: foo bar")]
        );
    }

    #[test]
    fn test_registry_priority_prefers_exact_ls() {
        let (first, argument) = find_command("ls").unwrap();
        assert!(matches!(first.pattern, Pattern::Exact("ls")));
        assert_eq!(argument, "");

        let (prefixed, argument) = find_command("ls C:\\").unwrap();
        assert!(matches!(prefixed.pattern, Pattern::Prefix("ls ")));
        assert_eq!(argument, "C:\\");
    }

    #[test]
    fn test_panicking_handler_becomes_execution_error() {
        let interpreter = Interpreter::new(Arc::new(PanickingStorage));
        let mut path = DEFAULT_START_PATH.to_string();

        let listed = interpreter.dispatch("ls", &mut path);
        assert_eq!(
            listed.output_lines,
            vec![Line::error("Error executing command: storage exploded")]
        );
        assert!(!listed.terminate);

        let moved = interpreter.dispatch("cd Documents", &mut path);
        assert_eq!(
            texts(&moved),
            vec!["Error executing command: storage exploded"]
        );
        assert_eq!(path, DEFAULT_START_PATH);
    }
}
