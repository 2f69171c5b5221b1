//! A `nom`-based parser for JPath.
use super::ast::{Path, Segment};
use crate::error::JPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{anychar, char, satisfy, u64 as nom_u64},
    combinator::{eof, map, peek},
    multi::{fold_many1, many0},
    sequence::{delimited, preceded, terminated},
};

type PResult<'a, O> = IResult<&'a str, O>;

// --- Main Public Parser ---

pub fn parse_path(input: &str) -> Result<Path, JPathError> {
    let trimmed = input.trim();
    match path(trimmed) {
        Ok(("", parsed)) => Ok(parsed),
        Ok((rem, _)) => Err(JPathError::Parse {
            path: input.to_string(),
            message: format!("Parser did not consume all input. Remainder: '{}'", rem),
        }),
        Err(e) => Err(JPathError::Parse {
            path: input.to_string(),
            message: e.to_string(),
        }),
    }
}

// --- Combinators ---

fn path(input: &str) -> PResult<'_, Path> {
    let (input, first) = segment(input)?;
    let (input, rest) = many0(alt((preceded(char('.'), segment), index_segment))).parse(input)?;
    let mut segments = vec![first];
    segments.extend(rest);
    Ok((input, Path { segments }))
}

fn segment(input: &str) -> PResult<'_, Segment> {
    alt((each_segment, map(key, Segment::Key))).parse(input)
}

/// A bare `#`. `#x` is an ordinary key, as is an escaped `\#`.
fn each_segment(input: &str) -> PResult<'_, Segment> {
    map(
        terminated(
            char('#'),
            peek(alt((map(eof, |_| ()), map(char('.'), |_| ()), map(char('['), |_| ())))),
        ),
        |_| Segment::Each,
    )
    .parse(input)
}

/// Key characters run up to the next unescaped `.` or `[`; `\` escapes the
/// following character.
fn key(input: &str) -> PResult<'_, String> {
    fold_many1(
        alt((
            preceded(char('\\'), anychar),
            satisfy(|c: char| c != '.' && c != '[' && c != '\\'),
        )),
        String::new,
        |mut acc, c| {
            acc.push(c);
            acc
        },
    )
    .parse(input)
}

fn index_segment(input: &str) -> PResult<'_, Segment> {
    map(delimited(char('['), nom_u64, char(']')), |i| {
        Segment::Index(i as usize)
    })
    .parse(input)
}
