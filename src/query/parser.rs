use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, take_until},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map},
    multi::many0,
    sequence::{delimited, preceded, terminated},
};
use unicode_segmentation::UnicodeSegmentation;
use crate::core::error::{Error, Result};
use crate::memory::arena::Arena;
use crate::query::terms::TermList;

/// Turns query text into terms stored in the caller's arena.
pub trait QueryParser {
    fn parse(&self, arena: &Arena, terms: &mut TermList, query: &str) -> Result<()>;
}

/// Whitespace-separated words and `"quoted phrases"`, split on Unicode word
/// boundaries and lowercased.
#[derive(Debug, Clone)]
pub struct StandardQueryParser {
    pub lowercase: bool,
    pub max_token_length: usize,
}

impl Default for StandardQueryParser {
    fn default() -> Self {
        StandardQueryParser {
            lowercase: true,
            max_token_length: 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment<'a> {
    Phrase(&'a str),
    Bare(&'a str),
}

fn phrase(input: &str) -> IResult<&str, Segment<'_>> {
    map(delimited(char('"'), take_until("\""), char('"')), Segment::Phrase).parse(input)
}

fn bare(input: &str) -> IResult<&str, Segment<'_>> {
    map(is_not(" \t\r\n\""), Segment::Bare).parse(input)
}

fn segments(input: &str) -> IResult<&str, Vec<Segment<'_>>> {
    all_consuming(terminated(many0(preceded(multispace0, alt((phrase, bare)))), multispace0)).parse(input)
}

impl StandardQueryParser {
    pub fn new(max_token_length: usize) -> Self {
        StandardQueryParser {
            max_token_length,
            ..StandardQueryParser::default()
        }
    }

    fn add_words(&self, arena: &Arena, terms: &mut TermList, text: &str) {
        for word in text.unicode_words() {
            if word.len() > self.max_token_length {
                continue;
            }
            if self.lowercase {
                terms.push(arena, &word.to_lowercase());
            } else {
                terms.push(arena, word);
            }
        }
    }
}

impl QueryParser for StandardQueryParser {
    fn parse(&self, arena: &Arena, terms: &mut TermList, query: &str) -> Result<()> {
        let segments = match segments(query) {
            Ok((_, segments)) => segments,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let at = query.len() - e.input.len();
                return Err(Error::parse(format!("unbalanced quote at byte {} in query {:?}", at, query)));
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(Error::parse(format!("incomplete query {:?}", query)));
            }
        };

        for segment in segments {
            match segment {
                Segment::Phrase(text) | Segment::Bare(text) => self.add_words(arena, terms, text),
            }
        }
        Ok(())
    }
}
