// ============================================================================
// subject-store - Selector Parsing
// Turns `a.b[2]['c']` into segments
// ============================================================================
//
// Grammar (whitespace allowed around names and inside brackets):
//   path     := name? ( '.' name | '[' index ']' | '[' quoted ']' )*
//   name     := (alphanumeric | '_')+
//   index    := '-'? digit+          (negative indices become keys)
//   quoted   := '\'' .* '\'' | '"' .* '"'   (no escapes)
// ============================================================================

use std::iter::Peekable;
use std::str::CharIndices;

use crate::core::error::PathError;
use crate::path::Segment;

type Chars<'a> = Peekable<CharIndices<'a>>;

/// Parse a selector into segments.
pub(crate) fn parse_segments(input: &str) -> Result<Vec<Segment>, PathError> {
    let mut chars = input.char_indices().peekable();
    let mut segments = Vec::new();

    skip_ws(&mut chars);
    if let Some(&(_, ch)) = chars.peek() {
        if is_name_char(ch) {
            segments.push(Segment::Key(read_name(&mut chars, input)?));
        }
    }

    loop {
        skip_ws(&mut chars);
        let Some((offset, ch)) = chars.next() else {
            break;
        };
        let segment = match ch {
            '.' => {
                skip_ws(&mut chars);
                Segment::Key(read_name(&mut chars, input)?)
            }
            '[' => read_bracket(&mut chars, offset)?,
            found => return Err(PathError::UnexpectedChar { found, offset }),
        };
        segments.push(segment);
    }

    Ok(segments)
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn skip_ws(chars: &mut Chars<'_>) {
    while chars.next_if(|&(_, ch)| ch.is_whitespace()).is_some() {}
}

fn read_name(chars: &mut Chars<'_>, input: &str) -> Result<String, PathError> {
    let start = chars.peek().map_or(input.len(), |&(offset, _)| offset);
    let mut end = start;
    while let Some((offset, ch)) = chars.next_if(|&(_, ch)| is_name_char(ch)) {
        end = offset + ch.len_utf8();
    }
    if start == end {
        return Err(PathError::EmptySegment { offset: start });
    }
    Ok(input[start..end].to_string())
}

fn read_bracket(chars: &mut Chars<'_>, open: usize) -> Result<Segment, PathError> {
    skip_ws(chars);
    let segment = match chars.next() {
        None => return Err(PathError::UnterminatedBracket { offset: open }),
        Some((offset, quote @ ('\'' | '"'))) => {
            let mut key = String::new();
            loop {
                match chars.next() {
                    None => return Err(PathError::UnterminatedQuote { offset }),
                    Some((_, ch)) if ch == quote => break,
                    Some((_, ch)) => key.push(ch),
                }
            }
            Segment::Key(key)
        }
        Some((offset, ch)) if ch == '-' || ch.is_ascii_digit() => {
            let mut digits = String::from(ch);
            while let Some((_, d)) = chars.next_if(|&(_, d)| d.is_ascii_digit()) {
                digits.push(d);
            }
            if digits == "-" {
                return Err(PathError::EmptySegment { offset });
            }
            match digits.parse::<usize>() {
                Ok(index) => Segment::Index(index),
                // Negative or too large for an index: a plain key
                Err(_) => Segment::Key(digits),
            }
        }
        Some((offset, ']')) => return Err(PathError::EmptySegment { offset }),
        Some((offset, found)) => return Err(PathError::UnexpectedChar { found, offset }),
    };

    skip_ws(chars);
    match chars.next() {
        Some((_, ']')) => Ok(segment),
        Some((offset, found)) => Err(PathError::UnexpectedChar { found, offset }),
        None => Err(PathError::UnterminatedBracket { offset: open }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
