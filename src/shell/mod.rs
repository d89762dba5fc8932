//! Line-oriented command shell over a [`TrieStore`]
//!
//! Each line is one command:
//!
//! ```text
//! put <key> <value>     # 42 -> int, true/false -> bool, anything else -> str
//! get <key> [<type>]    # type is int, bool or str; a mismatch reads as not found
//! remove <key>
//! list [<prefix>]
//! len
//! version
//! ```
//!
//! The key `""` is the empty key.

mod command;
mod output;

pub use command::{Command, Literal, ValueType};
pub use output::{Entry, Output, Record};

use crate::store::TrieStore;
use crate::Result;
use std::io::BufRead;
use tracing::debug;

/// Executes shell commands against a store
pub struct Shell<'s> {
    store: &'s TrieStore,
}

impl<'s> Shell<'s> {
    pub fn new(store: &'s TrieStore) -> Self {
        Shell { store }
    }

    /// Execute a parsed command
    pub fn execute(&self, command: Command) -> Output {
        debug!(?command, "executing");

        match command {
            Command::Put { key, value } => {
                let value_type = value.value_type();
                value.put_into(self.store, &key);
                Output::Put {
                    key,
                    value_type: value_type.to_string(),
                    version: self.store.version(),
                }
            }
            Command::Get {
                key,
                value_type: Some(value_type),
            } => {
                let value = value_type.read(self.store, &key);
                Output::Get {
                    key,
                    found: value.is_some(),
                    value_type: value.as_ref().map(|_| value_type.to_string()),
                    value,
                }
            }
            Command::Get {
                key,
                value_type: None,
            } => {
                let snapshot = self.store.snapshot();
                let found = snapshot.get_value(&key).map(|value| {
                    ValueType::classify(value)
                        .map(|(t, v)| (t.to_string(), Some(v)))
                        .unwrap_or_else(|| (value.type_name().to_string(), None))
                });
                match found {
                    Some((value_type, value)) => Output::Get {
                        key,
                        found: true,
                        value_type: Some(value_type),
                        value,
                    },
                    None => Output::Get {
                        key,
                        found: false,
                        value_type: None,
                        value: None,
                    },
                }
            }
            Command::Remove { key } => {
                let removed = self.store.remove(&key);
                Output::Remove {
                    key,
                    removed,
                    version: self.store.version(),
                }
            }
            Command::List { prefix } => {
                let snapshot = self.store.snapshot();
                let entries: Vec<Entry> = snapshot
                    .list_prefix(&prefix)
                    .into_iter()
                    .map(|(key, value)| {
                        let key = String::from_utf8_lossy(&key).into_owned();
                        match ValueType::classify(value) {
                            Some((t, v)) => Entry {
                                key,
                                value_type: t.to_string(),
                                value: Some(v),
                            },
                            None => Entry {
                                key,
                                value_type: value.type_name().to_string(),
                                value: None,
                            },
                        }
                    })
                    .collect();
                Output::List {
                    prefix,
                    count: entries.len(),
                    entries,
                }
            }
            Command::Len => Output::Len {
                len: self.store.len(),
            },
            Command::Version => Output::Version {
                version: self.store.version(),
            },
        }
    }

    /// Parse and execute one line; blank lines and comments produce nothing
    pub fn run_line(&self, line: &str, line_no: usize) -> Result<Option<Output>> {
        Ok(Command::parse(line, line_no)?.map(|command| self.execute(command)))
    }

    /// Run every line of a script, handing each output to `emit` as soon as
    /// it is produced
    ///
    /// Stops at the first error, after the outputs of every earlier line have
    /// been emitted. Returns the number of commands executed.
    pub fn run_script<F>(&self, reader: impl BufRead, mut emit: F) -> Result<usize>
    where
        F: FnMut(Output) -> Result<()>,
    {
        let mut executed = 0;
        for (index, line) in reader.lines().enumerate() {
            if let Some(output) = self.run_line(&line?, index + 1)? {
                executed += 1;
                emit(output)?;
            }
        }
        Ok(executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn run(script: &str) -> Vec<Output> {
        let store = TrieStore::new();
        let mut outputs = Vec::new();
        let executed = Shell::new(&store)
            .run_script(script.as_bytes(), |output| {
                outputs.push(output);
                Ok(())
            })
            .unwrap();
        assert_eq!(executed, outputs.len());
        outputs
    }

    #[test]
    fn test_shell_end_to_end() {
        let outputs = run("put a 1\nput b 2\nget a\nremove a\nget a\nget b\n");

        assert_eq!(
            outputs[2],
            Output::Get {
                key: "a".into(),
                found: true,
                value_type: Some("int".into()),
                value: Some(Value::from(1)),
            }
        );
        assert_eq!(
            outputs[3],
            Output::Remove {
                key: "a".into(),
                removed: true,
                version: 3,
            }
        );
        assert_eq!(
            outputs[4],
            Output::Get {
                key: "a".into(),
                found: false,
                value_type: None,
                value: None,
            }
        );
        assert!(matches!(&outputs[5], Output::Get { value: Some(v), .. } if *v == Value::from(2)));
    }

    #[test]
    fn test_shell_typed_get_mismatch() {
        let outputs = run("put k 42\nget k str\nget k int\n");
        assert!(matches!(&outputs[1], Output::Get { found: false, .. }));
        assert!(matches!(&outputs[2], Output::Get { found: true, .. }));
    }

    #[test]
    fn test_shell_list_and_len() {
        let outputs = run("put t:2 two\nput t:1 one\nput e:1 true\nlist t:\nlen\n");
        match &outputs[3] {
            Output::List { count, entries, .. } => {
                assert_eq!(*count, 2);
                assert_eq!(entries[0].key, "t:1");
                assert_eq!(entries[1].value, Some(Value::from("two")));
            }
            other => panic!("expected list output, got {:?}", other),
        }
        assert_eq!(outputs[4], Output::Len { len: 3 });
    }

    #[test]
    fn test_shell_remove_absent_keeps_version() {
        let outputs = run("remove ghost\nversion\n");
        assert_eq!(
            outputs[0],
            Output::Remove {
                key: "ghost".into(),
                removed: false,
                version: 0,
            }
        );
        assert_eq!(outputs[1], Output::Version { version: 0 });
    }

    #[test]
    fn test_shell_stops_at_bad_line() {
        let store = TrieStore::new();
        let mut emitted = Vec::new();
        let script = "put a 1\nbogus\nput b 2\n";
        let result = Shell::new(&store).run_script(script.as_bytes(), |output| {
            emitted.push(output);
            Ok(())
        });
        assert!(matches!(
            result,
            Err(crate::Error::UnknownCommand { line: 2, .. })
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn test_shell_emit_error_stops_script() {
        let store = TrieStore::new();
        let broken_pipe = || std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        let result = Shell::new(&store)
            .run_script("put a 1\nput b 2\n".as_bytes(), |_| Err(broken_pipe().into()));
        assert!(matches!(result, Err(crate::Error::Io(_))));
        assert_eq!(store.len(), 1);
    }
}
