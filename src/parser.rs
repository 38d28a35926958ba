//! Reader for value change dump (VCD) simulation traces.
//!
//! Parsing a trace produces two things: the [`Module`] hierarchy declared by the `$scope`
//! directives and a [`TraceStore`] holding the value changes of every wire. The trace format
//! may declare one wire under several names by reusing its identifier code, so the declarations
//! of every identifier are accumulated while parsing and only turned into [`AliasGroup`] keys once
//! the whole file has been read. An identifier first declared with a generator-internal name and
//! later with a meaningful one therefore ends up as a single group containing both names.
//!
//! All parser state lives in a context value owned by a single call, so any number of traces can
//! be parsed concurrently.
//!
//! # Examples
//!
//! ```rust
//! use specmine::parser::parse_trace;
//!
//! let text = "\
//! $scope module TOP $end
//! $var wire 1 ! clock $end
//! $var wire 1 \" valid $end
//! $scope module core $end
//! $var wire 1 \" io_valid $end
//! $upscope $end
//! $upscope $end
//! $enddefinitions $end
//! #0
//! 0!
//! 1\"
//! #1
//! 1!
//! ";
//!
//! let parsed = parse_trace(text).unwrap();
//! assert_eq!(parsed.module.name, "TOP");
//! assert_eq!(parsed.store.len(), 2);
//! ```
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::module::Module;
use crate::signal::{AliasGroup, Signal};
use crate::trace::{DeltaTrace, Time, TraceStore, Value};

mod commands;
mod common;
mod errors;

use commands::{command, split_section_end, Command};
pub use errors::{ErrorKind, ParseError};

/// The contents of one trace file
#[derive(Debug, Clone)]
pub struct ParsedTrace {
    /// Root of the design hierarchy
    pub module: Module,

    /// Raw value changes of every wire, keyed by alias group
    pub store: TraceStore,

    /// Text of the `$timescale` section, if the trace declared one
    pub timescale: Option<String>,
}

#[derive(Debug, Default)]
struct Symbol {
    aliases: BTreeSet<Signal>,
    events: DeltaTrace,
}

/// Multi-line header section currently being read
#[derive(Debug)]
struct Section {
    keyword: String,
    text: Vec<String>,
}

#[derive(Debug, Default)]
struct ParseContext {
    scopes: Vec<String>,
    modules: Vec<Module>,
    roots: Vec<Module>,
    symbols: HashMap<String, Symbol>,
    time: Time,
    definitions_done: bool,
    section: Option<Section>,
    timescale: Option<String>,
}

fn malformed(line: &str) -> ErrorKind {
    let keyword = line.split_whitespace().next().unwrap_or_default();

    match keyword {
        "$scope" | "$upscope" | "$var" | "$enddefinitions" | "$dumpvars" | "$dumpall" | "$dumpon"
        | "$dumpoff" | "$end" => ErrorKind::MalformedDirective(keyword.to_string()),
        _ if keyword.starts_with('$') => ErrorKind::UnknownDirective(keyword.to_string()),
        _ => ErrorKind::MalformedValueChange,
    }
}

/// Decode a binary digit string into an integer. Unknown and high-impedance digits read as 0.
fn decode_bits(bits: &str) -> Option<Value> {
    let digits: Vec<u8> = bits
        .bytes()
        .map(|digit| if digit == b'1' { b'1' } else { b'0' })
        .collect();

    Value::parse_bytes(&digits, 2)
}

impl ParseContext {
    fn feed(&mut self, line: &str) -> Result<(), ErrorKind> {
        if let Some(section) = self.section.as_mut() {
            let (text, closed) = split_section_end(line);
            section.text.push(text.to_string());

            if closed {
                self.close_section();
            }

            return Ok(());
        }

        if line.trim().is_empty() {
            return Ok(());
        }

        let (_, cmd) = command(line).map_err(|_| malformed(line))?;

        match cmd {
            Command::Scope { name, .. } => self.open_scope(name),
            Command::Upscope => self.close_scope()?,
            Command::Var { width, code, name } => self.declare(width, code, name)?,
            Command::EndDefinitions => self.definitions_done = true,
            Command::Header { keyword, text, closed } => {
                self.section = Some(Section {
                    keyword: keyword.to_string(),
                    text: vec![text.to_string()],
                });

                if closed {
                    self.close_section();
                }
            }
            Command::Dump => {}
            Command::Timestamp(time) => self.time = time,
            Command::Scalar { bit, code } => {
                let value = Value::from(u8::from(bit == '1'));
                self.change(code, value)?;
            }
            Command::Vector { bits, code } => {
                let value = decode_bits(bits).ok_or(ErrorKind::MalformedValueChange)?;
                self.change(code, value)?;
            }
            Command::Real { code } => {
                debug!(code, time = self.time, "ignoring real-valued change");
            }
        }

        Ok(())
    }

    fn close_section(&mut self) {
        if let Some(section) = self.section.take() {
            if section.keyword == "$timescale" {
                let text = section
                    .text
                    .iter()
                    .map(|part| part.trim())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");

                self.timescale = Some(text);
            }
        }
    }

    fn open_scope(&mut self, name: &str) {
        self.scopes.push(name.to_string());
        self.modules.push(Module::new(self.scopes.join(".")));
    }

    fn close_scope(&mut self) -> Result<(), ErrorKind> {
        let module = self.modules.pop().ok_or(ErrorKind::UnbalancedUpscope)?;
        self.scopes.pop();

        match self.modules.last_mut() {
            Some(parent) => parent.children.push(module),
            None => self.roots.push(module),
        }

        Ok(())
    }

    fn declare(&mut self, width: u32, code: &str, name: &str) -> Result<(), ErrorKind> {
        if self.definitions_done {
            return Err(ErrorKind::LateDeclaration);
        }

        let name = if self.scopes.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.scopes.join("."), name)
        };

        self.symbols
            .entry(code.to_string())
            .or_default()
            .aliases
            .insert(Signal::new(name, width));

        Ok(())
    }

    fn change(&mut self, code: &str, value: Value) -> Result<(), ErrorKind> {
        let symbol = self
            .symbols
            .get_mut(code)
            .ok_or_else(|| ErrorKind::UndeclaredSymbol(code.to_string()))?;

        symbol.events.insert(self.time, value);
        Ok(())
    }

    fn finish(mut self) -> Result<ParsedTrace, ErrorKind> {
        if let Some(section) = self.section.take() {
            return Err(ErrorKind::UnterminatedSection(section.keyword));
        }

        if !self.modules.is_empty() {
            return Err(ErrorKind::UnclosedScope(self.modules.len()));
        }

        if self.roots.len() != 1 {
            return Err(ErrorKind::RootCount(self.roots.len()));
        }

        let mut store = TraceStore::with_capacity(self.symbols.len());

        for (code, symbol) in self.symbols {
            let group = AliasGroup::new(symbol.aliases);

            if store.insert(group, symbol.events).is_some() {
                warn!(code = %code, "identifier repeats the names of another identifier, keeping the last one");
            }
        }

        let module = self.roots.remove(0);

        Ok(ParsedTrace {
            module,
            store,
            timescale: self.timescale,
        })
    }
}

fn parse_lines<I, E>(lines: I) -> Result<Result<ParsedTrace, ParseError>, E>
where
    I: IntoIterator<Item = Result<String, E>>,
{
    let mut context = ParseContext::default();
    let mut last = (0, String::new());

    for (index, line) in lines.into_iter().enumerate() {
        let line = line?;

        if let Err(kind) = context.feed(&line) {
            return Ok(Err(ParseError::new(index + 1, &line, kind)));
        }

        last = (index + 1, line);
    }

    Ok(context.finish().map_err(|kind| ParseError::new(last.0, &last.1, kind)))
}

/// Parse the text of a complete trace.
pub fn parse_trace(input: &str) -> Result<ParsedTrace, ParseError> {
    let lines = input.lines().map(|line| Ok::<_, std::convert::Infallible>(line.to_string()));

    match parse_lines(lines) {
        Ok(result) => result,
        Err(never) => match never {},
    }
}

/// Read and parse a trace file. Parse errors carry the path of the file.
pub fn read_trace(path: impl AsRef<Path>) -> Result<ParsedTrace, crate::Error> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let parsed = parse_lines(reader.lines())?.map_err(|err| err.with_file(path))?;

    info!(
        path = %path.display(),
        groups = parsed.store.len(),
        modules = parsed.module.walk().count(),
        "parsed trace"
    );

    Ok(parsed)
}
