//! Test doubles shared by the engine integration tests
//!
//! [`FakeGateway`] is an in-memory stand-in for the gateway CLI: it
//! interprets the exact command lines the protocol layer builds, keeps
//! object state, and renders listing output in the gateway's wire format,
//! including the `File is empty` convention and the shell's sentinel echo
//! on failure. Every executed line is recorded so tests can assert on
//! round trips.

use async_trait::async_trait;
use dynobj_core::error::Result;
use dynobj_core::traits::{ExecOutput, Transport};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

const BASE: &str = "dynamic_objects";
const SENTINEL_SUFFIX: &str = "|| echo __ERROR__";

/// In-memory gateway double.
#[derive(Default)]
pub struct FakeGateway {
    state: Arc<Mutex<BTreeMap<String, Vec<(u32, u32)>>>>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Second handle onto the same gateway state and command log.
    pub fn handle(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            commands: Arc::clone(&self.commands),
        }
    }

    /// Pre-seed an object, bypassing the command surface.
    pub fn seed(&self, name: &str, ranges: &[(u32, u32)]) {
        self.state
            .lock()
            .unwrap()
            .insert(name.to_owned(), ranges.to_vec());
    }

    /// Current ranges of an object, in stored order.
    pub fn ranges(&self, name: &str) -> Option<Vec<(u32, u32)>> {
        self.state.lock().unwrap().get(name).cloned()
    }

    pub fn object_exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().contains_key(name)
    }

    /// Every command line executed so far.
    pub fn executed(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Command lines that mutate gateway state (everything but `-l`).
    pub fn mutations(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|c| !c.starts_with("dynamic_objects -l"))
            .collect()
    }

    fn run_stage(&self, tokens: &[&str]) -> std::result::Result<Vec<String>, String> {
        let mut state = self.state.lock().unwrap();
        match tokens {
            ["-l"] => {
                if state.is_empty() {
                    return Err("File is empty".to_owned());
                }
                let mut out = Vec::new();
                for (name, ranges) in state.iter() {
                    out.push(format!("object name : {name}"));
                    for (i, (begin, end)) in ranges.iter().enumerate() {
                        out.push(format!(
                            "range {i} :\t{}\t{}",
                            Ipv4Addr::from(*begin),
                            Ipv4Addr::from(*end)
                        ));
                    }
                    out.push(String::new());
                }
                Ok(out)
            }
            ["-n", name] => {
                if state.contains_key(*name) {
                    return Err(format!("object {name} already defined"));
                }
                state.insert((*name).to_owned(), Vec::new());
                Ok(Vec::new())
            }
            ["-do", name] => state
                .remove(*name)
                .map(|_| Vec::new())
                .ok_or_else(|| format!("object {name} not found")),
            ["-o", name, "-r", rest @ ..] => {
                let (flag, pairs) = rest.split_last().ok_or("missing flag")?;
                if pairs.len() % 2 != 0 {
                    return Err("odd range argument count".to_owned());
                }
                let ranges = state
                    .get_mut(*name)
                    .ok_or_else(|| format!("object {name} not found"))?;
                let parsed: Vec<(u32, u32)> = pairs
                    .chunks(2)
                    .map(|pair| {
                        let begin = pair[0].parse::<Ipv4Addr>().map_err(|e| e.to_string())?;
                        let end = pair[1].parse::<Ipv4Addr>().map_err(|e| e.to_string())?;
                        Ok((u32::from(begin), u32::from(end)))
                    })
                    .collect::<std::result::Result<_, String>>()?;
                match *flag {
                    "-a" => {
                        ranges.extend(parsed);
                        Ok(Vec::new())
                    }
                    "-d" => {
                        for pair in parsed {
                            let idx = ranges
                                .iter()
                                .position(|r| *r == pair)
                                .ok_or_else(|| format!("range not in object: {pair:?}"))?;
                            ranges.remove(idx);
                        }
                        Ok(Vec::new())
                    }
                    other => Err(format!("unknown flag {other}")),
                }
            }
            other => Err(format!("unknown invocation {other:?}")),
        }
    }
}

#[async_trait]
impl Transport for FakeGateway {
    async fn execute(&self, command_line: &str) -> Result<ExecOutput> {
        self.commands.lock().unwrap().push(command_line.to_owned());

        let chain = command_line
            .strip_suffix(SENTINEL_SUFFIX)
            .expect("built lines always carry the sentinel suffix")
            .trim();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for stage in chain.split(" && ") {
            let tokens: Vec<&str> = stage.split_whitespace().collect();
            assert_eq!(tokens.first(), Some(&BASE), "stage without base command: {stage}");
            match self.run_stage(&tokens[1..]) {
                Ok(lines) => stdout.extend(lines),
                Err(message) => {
                    // the real tool reports on stdout; the shell then runs
                    // the || echo branch
                    stdout.push(message.clone());
                    stderr.push(message);
                    stdout.push("__ERROR__".to_owned());
                    break;
                }
            }
        }

        Ok(ExecOutput { stdout_lines: stdout, stderr_lines: stderr })
    }
}

/// Transport double returning fixed output for every command.
pub struct CannedTransport {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CannedTransport {
    pub fn new(stdout: &[&str], stderr: &[&str]) -> Self {
        Self {
            stdout: stdout.iter().map(|s| s.to_string()).collect(),
            stderr: stderr.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn execute(&self, _command_line: &str) -> Result<ExecOutput> {
        Ok(ExecOutput {
            stdout_lines: self.stdout.clone(),
            stderr_lines: self.stderr.clone(),
        })
    }
}

/// Dotted-quad shorthand for test fixtures.
pub fn ip(text: &str) -> u32 {
    text.parse::<Ipv4Addr>().unwrap().into()
}
