//! `.netrc` credential store.
//!
//! Credentials live in the user's netrc file under the machine
//! `api.<host>` (mirrored to `code.<host>`): the login is the account email
//! and the password is the API key. The file is kept as a token stream, so
//! other machines, comments, spacing and `macdef` blocks are written back
//! exactly as they were read.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// API keys longer than this are legacy tokens and are truncated on read.
pub const MAX_API_KEY_LEN: usize = 40;

/// An email address and the API key issued for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Whitespace, a comment or a whole `macdef` block.
    Text(String),
    Word(String),
}

impl Token {
    fn text(&self) -> &str {
        match self {
            Token::Text(text) | Token::Word(text) => text,
        }
    }

    fn word(&self) -> Option<&str> {
        match self {
            Token::Word(word) => Some(word),
            Token::Text(_) => None,
        }
    }
}

/// `macdef` runs through the first blank line after it.
fn macdef_len(rest: &str) -> usize {
    let mut len = 0;
    for (idx, line) in rest.split_inclusive('\n').enumerate() {
        len += line.len();
        if idx > 0 && line.trim().is_empty() {
            break;
        }
    }
    len
}

fn lex(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let (token, len) = if first.is_whitespace() {
            let len = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            (Token::Text(rest[..len].to_string()), len)
        } else if first == '#' {
            let len = rest.find('\n').unwrap_or(rest.len());
            (Token::Text(rest[..len].to_string()), len)
        } else {
            let word_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            if &rest[..word_len] == "macdef" {
                let len = macdef_len(rest);
                (Token::Text(rest[..len].to_string()), len)
            } else {
                (Token::Word(rest[..word_len].to_string()), word_len)
            }
        };
        tokens.push(token);
        rest = &rest[len..];
    }
    tokens
}

/// One `machine`/`default` entry with the exact tokens it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    /// `None` for `default`.
    machine: Option<String>,
    /// Words making up `machine NAME` or `default`.
    header_words: usize,
    tokens: Vec<Token>,
}

impl Entry {
    fn new(machine: &str, credentials: &Credentials) -> Self {
        let mut tokens = vec![
            Token::Word("machine".into()),
            Token::Text(" ".into()),
            Token::Word(machine.into()),
        ];
        for (key, value) in [("login", &credentials.email), ("password", &credentials.api_key)] {
            if !value.is_empty() {
                tokens.push(Token::Text("\n  ".into()));
                tokens.push(Token::Word(key.into()));
                tokens.push(Token::Text(" ".into()));
                tokens.push(Token::Word(value.clone()));
            }
        }
        tokens.push(Token::Text("\n".into()));
        Self {
            machine: Some(machine.to_string()),
            header_words: 2,
            tokens,
        }
    }

    /// Token indexes of the words after the header.
    fn body_words(&self) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.word().is_some())
            .map(|(idx, _)| idx)
            .skip(self.header_words)
            .collect()
    }

    /// Token index of the value following `key`.
    fn value_index(&self, key: &str) -> Option<usize> {
        self.body_words()
            .chunks(2)
            .find(|pair| pair.len() == 2 && self.tokens[pair[0]].text() == key)
            .map(|pair| pair[1])
    }

    fn value(&self, key: &str) -> Option<&str> {
        self.value_index(key).map(|idx| self.tokens[idx].text())
    }

    fn set_value(&mut self, key: &str, value: &str) {
        if let Some(idx) = self.value_index(key) {
            self.tokens[idx] = Token::Word(value.to_string());
            return;
        }
        let after_last_word = self
            .tokens
            .iter()
            .rposition(|token| token.word().is_some())
            .map_or(self.tokens.len(), |idx| idx + 1);
        self.tokens.splice(
            after_last_word..after_last_word,
            [
                Token::Text(" ".into()),
                Token::Word(key.into()),
                Token::Text(" ".into()),
                Token::Word(value.into()),
            ],
        );
    }

    /// Text after the entry's own last line: comments and macros that
    /// belong to whatever follows.
    fn trailing_text(&self) -> String {
        let start = self
            .tokens
            .iter()
            .rposition(|token| token.word().is_some())
            .map_or(0, |idx| idx + 1);
        let tail: String = self.tokens[start..].iter().map(Token::text).collect();
        match tail.find('\n') {
            Some(idx) => tail[idx + 1..].to_string(),
            None => String::new(),
        }
    }
}

enum Expect {
    MachineName,
    Value,
}

/// Parsed netrc file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netrc {
    /// Everything before the first entry.
    preamble: Vec<Token>,
    entries: Vec<Entry>,
}

impl Netrc {
    pub fn parse(text: &str) -> Self {
        let mut netrc = Self::default();
        let mut expect = None;
        for token in lex(text) {
            if let Token::Word(word) = &token {
                match expect.take() {
                    Some(Expect::MachineName) => {
                        if let Some(entry) = netrc.entries.last_mut() {
                            entry.machine = Some(word.clone());
                        }
                    }
                    Some(Expect::Value) => {}
                    None => match word.as_str() {
                        "machine" | "default" => {
                            let is_machine = word == "machine";
                            netrc.entries.push(Entry {
                                machine: None,
                                header_words: if is_machine { 2 } else { 1 },
                                tokens: Vec::new(),
                            });
                            if is_machine {
                                expect = Some(Expect::MachineName);
                            }
                        }
                        "login" | "password" | "account" => expect = Some(Expect::Value),
                        _ => {}
                    },
                }
            }
            match netrc.entries.last_mut() {
                Some(entry) => entry.tokens.push(token),
                None => netrc.preamble.push(token),
            }
        }
        netrc
    }

    fn find(&self, machine: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.machine.as_deref() == Some(machine))
    }

    pub fn get(&self, machine: &str) -> Option<Credentials> {
        let entry = &self.entries[self.find(machine)?];
        Some(Credentials::new(
            entry.value("login").unwrap_or_default(),
            entry.value("password").unwrap_or_default(),
        ))
    }

    /// Update `machine` in place, or add it before any `default` entry.
    pub fn set(&mut self, machine: &str, credentials: &Credentials) {
        match self.find(machine) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                entry.set_value("login", &credentials.email);
                entry.set_value("password", &credentials.api_key);
            }
            None => {
                let at = self
                    .entries
                    .iter()
                    .position(|e| e.machine.is_none())
                    .unwrap_or(self.entries.len());
                self.entries.insert(at, Entry::new(machine, credentials));
            }
        }
    }

    /// Remove `machine`; returns whether an entry existed.
    pub fn remove(&mut self, machine: &str) -> bool {
        let Some(idx) = self.find(machine) else {
            return false;
        };
        let kept = self.entries.remove(idx).trailing_text();
        if !kept.is_empty() {
            let text = Token::Text(kept);
            if let Some(prev) = idx.checked_sub(1).and_then(|prev| self.entries.get_mut(prev)) {
                prev.tokens.push(text);
            } else {
                self.preamble.push(text);
            }
        }
        true
    }

    pub fn render(&self) -> String {
        let mut out: String = self.preamble.iter().map(Token::text).collect();
        for entry in &self.entries {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.extend(entry.tokens.iter().map(Token::text));
        }
        out
    }
}

/// File-backed credential store for one API host.
///
/// Credentials are read from `machine`; saves and deletes also apply to
/// every mirror machine.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    machine: String,
    mirrors: Vec<String>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, machine: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            machine: machine.into(),
            mirrors: Vec::new(),
        }
    }

    /// Also write and delete `machine` alongside the primary one.
    pub fn mirrored_to(mut self, machine: impl Into<String>) -> Self {
        self.mirrors.push(machine.into());
        self
    }

    fn machines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.machine.as_str()).chain(self.mirrors.iter().map(String::as_str))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_netrc(&self) -> std::io::Result<Netrc> {
        if !self.path.exists() {
            return Ok(Netrc::default());
        }
        Ok(Netrc::parse(&fs::read_to_string(&self.path)?))
    }

    fn write_netrc(&self, netrc: &Netrc) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, netrc.render())?;
        restrict_permissions(&self.path)
    }

    /// Read the stored credentials. Legacy long keys are truncated and rewritten.
    pub fn load(&self) -> std::io::Result<Option<Credentials>> {
        let netrc = self.read_netrc()?;
        let Some(mut credentials) = netrc.get(&self.machine) else {
            debug!(path = %self.path.display(), machine = %self.machine, "no stored credentials");
            return Ok(None);
        };
        if credentials.api_key.len() > MAX_API_KEY_LEN {
            credentials.api_key = credentials.api_key.chars().take(MAX_API_KEY_LEN).collect();
            self.save(&credentials)?;
        }
        Ok(Some(credentials))
    }

    pub fn save(&self, credentials: &Credentials) -> std::io::Result<()> {
        let mut netrc = self.read_netrc()?;
        for machine in self.machines() {
            netrc.set(machine, credentials);
        }
        debug!(path = %self.path.display(), machine = %self.machine, "saving credentials");
        self.write_netrc(&netrc)
    }

    /// Remove stored credentials; a missing file is not an error.
    pub fn delete(&self) -> std::io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut netrc = self.read_netrc()?;
        let mut removed = false;
        for machine in self.machines() {
            removed |= netrc.remove(machine);
        }
        if removed {
            self.write_netrc(&netrc)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
