// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP/IFC Parser using nom
//!
//! Zero-copy tokenization, statement splitting and entity scanning.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// STEP/IFC Token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: #123
    EntityRef(u32),
    /// String literal: 'text'
    String(&'a str),
    /// Integer: 42
    Integer(i64),
    /// Float: 3.14
    Float(f64),
    /// Enum: .TRUE., .FALSE., .UNKNOWN.
    Enum(&'a str),
    /// List: (1, 2, 3)
    List(Vec<Token<'a>>),
    /// Typed value: IFCPARAMETERVALUE(0.), IFCBOOLEAN(.T.)
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value: $
    Null,
    /// Asterisk (derived value): *
    Derived,
}

/// Parse entity reference: #123
fn entity_ref(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        Token::EntityRef,
    )(input)
}

/// Parse string literal: 'text'
/// STEP uses '' to escape a single quote within a string
fn string_literal(input: &str) -> IResult<&str, Token> {
    fn parse_string_content(input: &str) -> IResult<&str, &str> {
        let bytes = input.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                    i += 2;
                    continue;
                }
                return Ok((&input[i..], &input[..i]));
            }
            i += 1;
        }

        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )))
    }

    map(
        delimited(char('\''), parse_string_content, char('\'')),
        Token::String,
    )(input)
}

/// Parse integer: 42, -42
fn integer(input: &str) -> IResult<&str, Token> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>().map(Token::Integer)
    })(input)
}

/// Parse float: 3.14, -3.14, 1.5E-10, 0., 1.
/// STEP allows floats like "0." without decimal digits
fn float(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>().map(Token::Float),
    )(input)
}

/// Parse enum: .TRUE., .F., .ELEMENT.
fn enum_value(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('.'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            char('.'),
        ),
        Token::Enum,
    )(input)
}

fn null(input: &str) -> IResult<&str, Token> {
    map(char('$'), |_| Token::Null)(input)
}

fn derived(input: &str) -> IResult<&str, Token> {
    map(char('*'), |_| Token::Derived)(input)
}

/// Comma separated arguments between parentheses
fn arguments(input: &str) -> IResult<&str, Vec<Token>> {
    delimited(
        char('('),
        separated_list0(delimited(ws, char(','), ws), token),
        preceded(ws, char(')')),
    )(input)
}

/// Parse typed value: IFCPARAMETERVALUE(0.), IFCLENGTHMEASURE(0.3048)
fn typed_value(input: &str) -> IResult<&str, Token> {
    map(
        pair(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            preceded(ws, arguments),
        ),
        |(type_name, args)| Token::TypedValue(type_name, args),
    )(input)
}

fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

/// Parse a token with optional surrounding whitespace
fn token(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            float, // before integer, float includes '.'
            integer,
            entity_ref,
            string_literal,
            enum_value,
            list,
            typed_value,
            null,
            derived,
        )),
        ws,
    )(input)
}

/// Parse list: (1, 2, 3) or nested lists
fn list(input: &str) -> IResult<&str, Token> {
    map(arguments, Token::List)(input)
}

/// Parse a standalone value such as a header statement body
/// Example: FILE_SCHEMA(('IFC4'))
pub fn parse_value(input: &str) -> Result<Token> {
    match token(input) {
        Ok(("", value)) => Ok(value),
        Ok((rest, _)) => Err(Error::parse(
            input.len() - rest.len(),
            format!("Trailing content: {:?}", &rest[..rest.len().min(40)]),
        )),
        Err(e) => Err(Error::parse(0, format!("Failed to parse value: {}", e))),
    }
}

/// Parse a complete entity instance
/// Example: #123=IFCWALL('guid','owner',$,$,'name',$,$,$);
pub fn parse_entity(input: &str) -> Result<(u32, &str, Vec<Token>)> {
    let result: IResult<&str, (u32, &str, Vec<Token>)> = tuple((
        delimited(
            ws,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
            ws,
        ),
        preceded(
            char('='),
            delimited(
                ws,
                take_while1(|c: char| c.is_alphanumeric() || c == '_'),
                ws,
            ),
        ),
        terminated(arguments, tuple((ws, char(';'), ws))),
    ))(input);

    match result {
        Ok(("", (id, type_name, args))) => Ok((id, type_name, args)),
        Ok((rest, _)) => Err(Error::parse(
            input.len() - rest.len(),
            "Unexpected content after entity",
        )),
        Err(e) => Err(Error::parse(0, format!("Failed to parse entity: {}", e))),
    }
}

/// Complex (multi-type) instances look like `#12=(IFCA() IFCB());`
pub fn is_complex_instance(input: &str) -> bool {
    input
        .split_once('=')
        .map(|(_, rest)| rest.trim_start().starts_with('('))
        .unwrap_or(false)
}

/// Find the terminating ';' of the statement starting at `from`,
/// skipping quoted strings. Returns the index of the ';'.
fn statement_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let offset = memchr::memchr2(b';', b'\'', &bytes[pos..])?;
        pos += offset;
        if bytes[pos] == b';' {
            return Some(pos);
        }
        // Inside a string: the next quote closes it, a doubled quote is an escape
        pos += 1;
        loop {
            let close = memchr::memchr(b'\'', &bytes[pos..])?;
            pos += close + 1;
            if bytes.get(pos) == Some(&b'\'') {
                pos += 1;
                continue;
            }
            break;
        }
    }
}

/// Iterator over `;`-terminated STEP statements as byte ranges
/// (start of first significant char, one past the ';').
/// Whitespace and `/* */` comments between statements are skipped.
pub struct Statements<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Statements<'a> {
    pub fn new(content: &'a str) -> Self {
        Self::starting_at(content, 0)
    }

    pub fn starting_at(content: &'a str, position: usize) -> Self {
        Self {
            bytes: content.as_bytes(),
            position,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            while self.position < self.bytes.len() && self.bytes[self.position].is_ascii_whitespace() {
                self.position += 1;
            }
            if self.bytes[self.position..].starts_with(b"/*") {
                match memchr::memmem::find(&self.bytes[self.position + 2..], b"*/") {
                    Some(end) => self.position += end + 4,
                    None => self.position = self.bytes.len(),
                }
                continue;
            }
            break;
        }
    }
}

impl Iterator for Statements<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        if self.position >= self.bytes.len() {
            return None;
        }
        let start = self.position;
        let end = statement_end(self.bytes, start)? + 1;
        self.position = end;
        Some((start, end))
    }
}

/// Fast entity scanner - scans content without full parsing
/// O(n) performance for finding entities by type
pub struct EntityScanner<'a> {
    content: &'a str,
    statements: Statements<'a>,
    start: usize,
}

impl<'a> EntityScanner<'a> {
    pub fn new(content: &'a str) -> Self {
        Self::with_offset(content, 0)
    }

    /// Scan starting at a byte offset (e.g. the start of the DATA section)
    pub fn with_offset(content: &'a str, start: usize) -> Self {
        Self {
            content,
            statements: Statements::starting_at(content, start),
            start,
        }
    }

    /// Scan for the next entity instance
    /// Returns (entity_id, type_name, line_start, line_end)
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        for (start, end) in self.statements.by_ref() {
            let line = &self.content[start..end];
            let Some(rest) = line.strip_prefix('#') else {
                continue;
            };

            let id_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
            let Ok(id) = rest[..id_len].parse::<u32>() else {
                continue;
            };

            let Some(eq_pos) = rest[id_len..].find('=') else {
                continue;
            };
            let after_eq = &rest[id_len + eq_pos + 1..];
            let type_text = after_eq.trim_start();
            let type_len = type_text
                .find(|c: char| c == '(' || c.is_whitespace())
                .unwrap_or(type_text.len());

            return Some((id, &type_text[..type_len], start, end));
        }
        None
    }

    /// Find all entities of a specific type
    pub fn find_by_type(&mut self, target_type: &str) -> Vec<(u32, usize, usize)> {
        let mut results = Vec::new();

        while let Some((id, type_name, start, end)) = self.next_entity() {
            if type_name.eq_ignore_ascii_case(target_type) {
                results.push((id, start, end));
            }
        }

        results
    }

    /// Reset scanner to its starting offset
    pub fn reset(&mut self) {
        self.statements = Statements::starting_at(self.content, self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref() {
        assert_eq!(entity_ref("#123"), Ok(("", Token::EntityRef(123))));
        assert_eq!(entity_ref("#0"), Ok(("", Token::EntityRef(0))));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("'hello'"), Ok(("", Token::String("hello"))));
        assert_eq!(
            string_literal("'it''s'"),
            Ok(("", Token::String("it''s")))
        );
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(float("3.14"), Ok(("", Token::Float(3.14))));
        assert_eq!(float("-3.14"), Ok(("", Token::Float(-3.14))));
        assert_eq!(float("1.5E-10"), Ok(("", Token::Float(1.5e-10))));
        assert_eq!(float("0."), Ok(("", Token::Float(0.0))));
        assert_eq!(float("1.E3"), Ok(("", Token::Float(1000.0))));
    }

    #[test]
    fn test_enum() {
        assert_eq!(enum_value(".T."), Ok(("", Token::Enum("T"))));
        assert_eq!(enum_value(".LENGTHUNIT."), Ok(("", Token::Enum("LENGTHUNIT"))));
    }

    #[test]
    fn test_nested_list() {
        let (_, token) = list("(1,(2,3),4)").unwrap();
        match token {
            Token::List(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[1], Token::List(vec![Token::Integer(2), Token::Integer(3)]));
            }
            _ => panic!("Expected List token"),
        }
    }

    #[test]
    fn test_parse_entity() {
        let (id, type_name, args) =
            parse_entity("#123=IFCWALL('guid','owner',$,$,'name',$,$,$);").unwrap();
        assert_eq!(id, 123);
        assert_eq!(type_name, "IFCWALL");
        assert_eq!(args.len(), 8);
    }

    #[test]
    fn test_parse_entity_typed_value() {
        let (_, _, args) =
            parse_entity("#5=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(0.3048),#4);").unwrap();
        assert_eq!(
            args[0],
            Token::TypedValue("IFCLENGTHMEASURE", vec![Token::Float(0.3048)])
        );
        assert_eq!(args[1], Token::EntityRef(4));
    }

    #[test]
    fn test_parse_entity_rejects_garbage() {
        assert!(parse_entity("#9=IFCDIRECTION((0.,0.,1.);").is_err());
        assert!(parse_entity("#9 IFCDIRECTION((0.,0.,1.));").is_err());
    }

    #[test]
    fn test_complex_instance() {
        assert!(is_complex_instance("#7=(IFCNAMEDUNIT(*,.LENGTHUNIT.) IFCSIUNIT());"));
        assert!(!is_complex_instance("#7=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);"));
    }

    #[test]
    fn test_statements_skip_strings_and_comments() {
        let content = "/* header; comment */ A('x;y'); B('it''s;'); #1=C();";
        let statements: Vec<&str> = Statements::new(content)
            .map(|(s, e)| &content[s..e])
            .collect();
        assert_eq!(statements, vec!["A('x;y');", "B('it''s;');", "#1=C();"]);
    }

    #[test]
    fn test_entity_scanner() {
        let content = r#"
DATA;
#1=IFCPROJECT('guid',$,'a;b',$,$,$,$,$,$);
#2=IFCWALL('guid2',$,$,$,$,$,$,$);
#3 = IFCDOOR('guid3',$,$,$,$,$,$,$);
#4=IFCWALL('guid4',$,$,$,$,$,$,$);
ENDSEC;
"#;

        let mut scanner = EntityScanner::new(content);
        let (id, type_name, _, _) = scanner.next_entity().unwrap();
        assert_eq!(id, 1);
        assert_eq!(type_name, "IFCPROJECT");

        scanner.reset();
        let walls = scanner.find_by_type("IfcWall");
        assert_eq!(walls.len(), 2);
        assert_eq!(walls[0].0, 2);
        assert_eq!(walls[1].0, 4);

        scanner.reset();
        let doors = scanner.find_by_type("IFCDOOR");
        assert_eq!(doors.len(), 1);
    }
}
