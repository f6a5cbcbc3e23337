//! Doc blocks: the help text a command is declared with.
//!
//! A doc block is plain text whose first line is the banner
//! (`bots:info`), followed by a blank line, a one-line summary and any
//! further description. Option declarations are indented lines of the form
//! `  -s, --shell  # output shell friendly pairs`.
//!
//! Doc blocks can also be recovered from `#` comments sitting directly above
//! a definition in a source file ([`extract_comment_block`]).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::options::OptionSpec;
use super::registry::RegistryError;

static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+-(.+)#(.+)").expect("static regex"));
static LOCATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?):(\d+)").expect("static regex"));

/// Collect the comment block above the definition at 1-based `line_number`.
///
/// Walks upward from the line just above the definition over blank lines
/// and `#` lines, stops at the first other line. Only the `#` marker is
/// stripped, so option lines keep the indentation that marks them; the
/// result is in top-to-bottom order.
pub fn extract_comment_block<S: AsRef<str>>(lines: &[S], line_number: usize) -> Vec<String> {
    let mut buffer = Vec::new();
    let Some(start) = line_number.checked_sub(2) else {
        return buffer;
    };
    for line in lines.iter().take(start + 1).rev() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix('#') {
            Some(body) => buffer.push(body.to_string()),
            None => break,
        }
    }
    buffer.reverse();
    buffer
}

/// Parsed help text of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub banner: String,
    /// The whole block, newline-joined.
    pub help: String,
    pub summary: String,
    /// The block without option declarations.
    pub description: String,
    pub options: Vec<OptionSpec>,
}

impl DocBlock {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self::from_lines(&lines)
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref()).collect();
        let banner = lines.first().map(|l| l.trim().to_string()).unwrap_or_default();

        let description = lines
            .iter()
            .filter(|line| !OPTION_LINE.is_match(line))
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        let summary = description
            .split('\n')
            .nth(2)
            .map(|l| l.trim().to_string())
            .unwrap_or_default();

        let options = lines
            .iter()
            .filter(|line| OPTION_LINE.is_match(line))
            .filter_map(|line| parse_option_line(line))
            .collect();

        Self {
            banner,
            help: lines.join("\n"),
            summary,
            description,
            options,
        }
    }

    /// Doc block from the comments above `locator` (`path:line`).
    pub fn from_source(cache: &mut SourceCache, locator: &str) -> Result<Self, RegistryError> {
        let locator = Locator::parse(locator)?;
        let lines = cache.lines(&locator.path)?;
        Ok(Self::from_lines(&extract_comment_block(lines, locator.line)))
    }
}

fn parse_option_line(line: &str) -> Option<OptionSpec> {
    let (flags, help) = line.split_once('#')?;
    let forms: Vec<&str> = flags
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    let spec = OptionSpec::new("", &forms);
    let name_source = spec
        .arg_specs
        .iter()
        .find(|f| f.starts_with("--"))
        .or_else(|| spec.arg_specs.first())?;
    let name = name_source
        .split([' ', '='])
        .next()
        .unwrap_or_default()
        .trim_start_matches('-')
        .replace('-', "_");
    if name.is_empty() {
        return None;
    }
    Some(OptionSpec {
        name,
        help: help.trim().to_string(),
        ..spec
    })
}

/// A `path:line` source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub path: PathBuf,
    pub line: usize,
}

impl Locator {
    /// Everything up to the first `:` followed by digits is the path, so
    /// Windows drive letters survive.
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        let captures = LOCATOR
            .captures(text)
            .ok_or_else(|| RegistryError::MalformedLocator(text.to_string()))?;
        let line = captures[2]
            .parse()
            .map_err(|_| RegistryError::MalformedLocator(text.to_string()))?;
        Ok(Self {
            path: PathBuf::from(&captures[1]),
            line,
        })
    }
}

/// Lines of source files, read once per path.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<PathBuf, Vec<String>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&mut self, path: &Path) -> Result<&[String], RegistryError> {
        if !self.files.contains_key(path) {
            debug!(path = %path.display(), "reading source for doc blocks");
            let text = fs::read_to_string(path).map_err(|source| RegistryError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
            self.files
                .insert(path.to_path_buf(), text.lines().map(str::to_string).collect());
        }
        Ok(self.files.get(path).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
