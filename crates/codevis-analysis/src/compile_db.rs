//! `compile_commands.json` loading.
//!
//! Entries are `{directory, file, command | arguments}`. Relative file names
//! are resolved against the entry's directory, which is itself resolved
//! against the database's own directory. Only C and C++ files are kept.

use std::path::{Path, PathBuf};

use codevis_core::errors::CompilationDatabaseError;
use serde::Deserialize;
use tracing::info;

use crate::paths::{categorise_path, FileType};

#[derive(Debug, Deserialize)]
struct RawCommand {
    #[serde(default)]
    directory: PathBuf,
    file: PathBuf,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    arguments: Option<Vec<String>>,
}

/// One translation unit and the compiler invocation that builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    pub arguments: Vec<String>,
}

/// Header search paths taken from a compile command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSearch {
    /// `-iquote`: searched for `"..."` includes only, after the includer's directory.
    pub quote: Vec<PathBuf>,
    /// `-I` and `-isystem`: searched for both include forms.
    pub angled: Vec<PathBuf>,
}

impl CompileCommand {
    pub fn new(directory: impl Into<PathBuf>, file: impl Into<PathBuf>, arguments: Vec<String>) -> Self {
        Self {
            directory: directory.into(),
            file: file.into(),
            arguments,
        }
    }

    /// Include paths named by the arguments, relative ones resolved against
    /// the command's directory. `extra` is appended to the angled list.
    pub fn include_search(&self, extra: &[PathBuf]) -> IncludeSearch {
        let mut search = IncludeSearch::default();
        let resolve = |p: &str| {
            let path = PathBuf::from(p);
            if path.is_relative() {
                self.directory.join(path)
            } else {
                path
            }
        };

        let mut args = self.arguments.iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = if let Some(rest) = arg.strip_prefix("-iquote") {
                ("-iquote", rest)
            } else if let Some(rest) = arg.strip_prefix("-isystem") {
                ("-isystem", rest)
            } else if let Some(rest) = arg.strip_prefix("-I") {
                ("-I", rest)
            } else {
                continue;
            };
            let value = if inline.is_empty() {
                match args.next() {
                    Some(next) => next.as_str(),
                    None => break,
                }
            } else {
                inline
            };
            match flag {
                "-iquote" => search.quote.push(resolve(value)),
                _ => search.angled.push(resolve(value)),
            }
        }
        search.angled.extend(extra.iter().cloned());
        search
    }
}

/// Compile commands combined from one or more databases.
#[derive(Debug, Clone, Default)]
pub struct CompilationDatabase {
    commands: Vec<CompileCommand>,
}

impl CompilationDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, CompilationDatabaseError> {
        let mut db = Self::new();
        db.add_compilation_database(path)?;
        Ok(db)
    }

    pub fn from_commands(commands: Vec<CompileCommand>) -> Self {
        let mut db = Self::new();
        db.add_commands(commands, Path::new(""));
        db
    }

    /// Parses `path` and appends its C/C++ commands.
    pub fn add_compilation_database(&mut self, path: &Path) -> Result<(), CompilationDatabaseError> {
        let content = std::fs::read_to_string(path).map_err(|e| CompilationDatabaseError::ErrorLoadingFromFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let raw: Vec<RawCommand> =
            serde_json::from_str(&content).map_err(|e| CompilationDatabaseError::ErrorLoadingFromFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if raw.is_empty() {
            return Err(CompilationDatabaseError::CompileCommandsContainsNoFiles {
                path: path.to_path_buf(),
            });
        }

        let commands: Vec<CompileCommand> = raw
            .into_iter()
            .filter_map(|entry| {
                let arguments = match (entry.arguments, entry.command) {
                    (Some(arguments), _) if !arguments.is_empty() => arguments,
                    (_, Some(command)) if !command.trim().is_empty() => split_command(&command),
                    _ => return None,
                };
                Some(CompileCommand::new(entry.directory, entry.file, arguments))
            })
            .collect();
        if commands.is_empty() {
            return Err(CompilationDatabaseError::CompileCommandsContainsNoCommands {
                path: path.to_path_buf(),
            });
        }

        let build_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let before = self.commands.len();
        self.add_commands(commands, build_dir);
        info!(
            path = %path.display(),
            added = self.commands.len() - before,
            "compilation database loaded"
        );
        Ok(())
    }

    /// Appends `commands`, resolving relative paths against `build_dir` and
    /// dropping anything that is not a C or C++ file.
    pub fn add_commands(&mut self, commands: Vec<CompileCommand>, build_dir: &Path) {
        for mut cmd in commands {
            if cmd.directory.is_relative() {
                cmd.directory = build_dir.join(&cmd.directory);
            }
            if cmd.file.is_relative() {
                cmd.file = cmd.directory.join(&cmd.file);
            }
            if matches!(categorise_path(&cmd.file), FileType::Header | FileType::Source) {
                self.commands.push(cmd);
            }
        }
    }

    /// The commands for which `keep` holds, in the same order.
    pub fn filtered(&self, keep: impl Fn(&CompileCommand) -> bool) -> Self {
        Self {
            commands: self.commands.iter().filter(|c| keep(c)).cloned().collect(),
        }
    }

    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.commands.iter().map(|c| c.file.as_path())
    }

    pub fn command_for(&self, file: &Path) -> Option<&CompileCommand> {
        self.commands.iter().find(|c| c.file == file)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Shell-style split: whitespace separates, quotes group, backslash escapes.
pub fn split_command(command: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    out.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_db(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("compile_commands.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn split_handles_quotes_and_escapes() {
        assert_eq!(
            split_command(r#"c++ -DNAME="a b" '-I/x y' -c a\ b.cpp"#),
            vec!["c++", "-DNAME=a b", "-I/x y", "-c", "a b.cpp"]
        );
        assert!(split_command("   ").is_empty());
    }

    #[test]
    fn include_search_reads_all_flag_forms() {
        let cmd = CompileCommand::new(
            "/build",
            "/src/a.cpp",
            split_command("c++ -Iinc -I /abs -isystem sys -iquote q -c a.cpp"),
        );
        let search = cmd.include_search(&[PathBuf::from("/extra")]);
        assert_eq!(search.quote, vec![PathBuf::from("/build/q")]);
        assert_eq!(
            search.angled,
            vec![
                PathBuf::from("/build/inc"),
                PathBuf::from("/abs"),
                PathBuf::from("/build/sys"),
                PathBuf::from("/extra"),
            ]
        );
    }

    #[test]
    fn relative_files_resolve_and_non_cpp_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_db(
            dir.path(),
            r#"[
                {"directory": "/build", "file": "a.cpp", "command": "c++ -c a.cpp"},
                {"directory": "/build", "file": "/src/b.h", "arguments": ["c++", "-c", "b.h"]},
                {"directory": "/build", "file": "notes.txt", "command": "cat notes.txt"}
            ]"#,
        );
        let db = CompilationDatabase::load(&path).unwrap();
        let files: Vec<&Path> = db.files().collect();
        assert_eq!(files, vec![Path::new("/build/a.cpp"), Path::new("/src/b.h")]);
        assert!(db.command_for(Path::new("/src/b.h")).is_some());
    }

    #[test]
    fn empty_and_commandless_databases_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_db(dir.path(), "[]");
        assert!(matches!(
            CompilationDatabase::load(&empty),
            Err(CompilationDatabaseError::CompileCommandsContainsNoFiles { .. })
        ));

        let commandless = write_db(dir.path(), r#"[{"directory": "/b", "file": "a.cpp"}]"#);
        assert!(matches!(
            CompilationDatabase::load(&commandless),
            Err(CompilationDatabaseError::CompileCommandsContainsNoCommands { .. })
        ));

        let garbage = write_db(dir.path(), "{ not json");
        assert!(matches!(
            CompilationDatabase::load(&garbage),
            Err(CompilationDatabaseError::ErrorLoadingFromFile { .. })
        ));
    }
}
