//! Line-level grammar of the value change dump format.
//!
//! Every line of a trace is classified into a [`Command`] without looking at any surrounding
//! context. Interpreting the commands (tracking scopes, the current time, and so on) is left to
//! the parse context.
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, one_of, space1};
use nom::combinator::{eof, map, rest};
use nom::multi::many_till;
use nom::sequence::{pair, preceded, terminated, tuple};
use nom::IResult;

use super::common::{arg, end, integer, line_end, word};
use crate::trace::Time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Scope { kind: &'a str, name: &'a str },
    Upscope,
    Var { width: u32, code: &'a str, name: &'a str },
    EndDefinitions,
    /// Opening line of a `$date`, `$version`, `$timescale` or `$comment` section
    Header { keyword: &'a str, text: &'a str, closed: bool },
    /// `$dumpvars`, `$dumpall`, `$dumpon`, `$dumpoff` or a bare `$end`
    Dump,
    Timestamp(Time),
    Scalar { bit: char, code: &'a str },
    Vector { bits: &'a str, code: &'a str },
    Real { code: &'a str },
}

fn scope(input: &str) -> IResult<&str, Command<'_>> {
    let kind = alt((tag("module"), tag("begin"), tag("fork"), tag("function"), tag("task")));
    let mut parser = tuple((tag("$scope"), preceded(space1, kind), arg, end));
    let (rest, (_, kind, name, _)) = parser(input)?;

    Ok((rest, Command::Scope { kind, name }))
}

fn upscope(input: &str) -> IResult<&str, Command<'_>> {
    map(pair(tag("$upscope"), end), |_| Command::Upscope)(input)
}

fn var(input: &str) -> IResult<&str, Command<'_>> {
    let width = preceded(space1, integer);
    let trailing = many_till(arg, end);
    let mut parser = tuple((tag("$var"), arg, width, arg, arg, trailing));
    let (rest, (_, _, width, code, name, _)) = parser(input)?;

    Ok((rest, Command::Var { width, code, name }))
}

fn enddefinitions(input: &str) -> IResult<&str, Command<'_>> {
    map(pair(tag("$enddefinitions"), end), |_| Command::EndDefinitions)(input)
}

fn header(input: &str) -> IResult<&str, Command<'_>> {
    let keyword = alt((tag("$date"), tag("$version"), tag("$timescale"), tag("$comment")));
    let mut parser = pair(keyword, alt((preceded(space1, rest), eof)));
    let (remaining, (keyword, text)) = parser(input)?;
    let (text, closed) = split_section_end(text);

    Ok((remaining, Command::Header { keyword, text, closed }))
}

/// Separate a trailing `$end` token from the text of a section line.
pub(crate) fn split_section_end(text: &str) -> (&str, bool) {
    let text = text.trim_end();

    match text.strip_suffix("$end") {
        Some(body) if body.is_empty() || body.ends_with(char::is_whitespace) => (body.trim(), true),
        _ => (text.trim(), false),
    }
}

fn dump(input: &str) -> IResult<&str, Command<'_>> {
    let keyword = alt((tag("$dumpvars"), tag("$dumpall"), tag("$dumpon"), tag("$dumpoff"), tag("$end")));
    map(terminated(keyword, alt((end, line_end))), |_| Command::Dump)(input)
}

fn timestamp(input: &str) -> IResult<&str, Command<'_>> {
    map(terminated(preceded(char('#'), integer), line_end), Command::Timestamp)(input)
}

fn is_bit(c: char) -> bool {
    matches!(c, '0' | '1' | 'x' | 'X' | 'z' | 'Z')
}

fn scalar(input: &str) -> IResult<&str, Command<'_>> {
    let mut parser = terminated(pair(one_of("01xXzZ"), word), line_end);
    let (rest, (bit, code)) = parser(input)?;

    Ok((rest, Command::Scalar { bit, code }))
}

fn vector(input: &str) -> IResult<&str, Command<'_>> {
    let mut parser = terminated(tuple((one_of("bB"), take_while1(is_bit), arg)), line_end);
    let (rest, (_, bits, code)) = parser(input)?;

    Ok((rest, Command::Vector { bits, code }))
}

fn real(input: &str) -> IResult<&str, Command<'_>> {
    let mut parser = terminated(tuple((one_of("rR"), word, arg)), line_end);
    let (rest, (_, _, code)) = parser(input)?;

    Ok((rest, Command::Real { code }))
}

/// Classify a single line of a trace file, ignoring leading whitespace.
pub fn command(line: &str) -> IResult<&str, Command<'_>> {
    let mut parser = alt((
        scope,
        upscope,
        var,
        enddefinitions,
        header,
        dump,
        timestamp,
        vector,
        real,
        scalar,
    ));

    parser(line.trim_start())
}
