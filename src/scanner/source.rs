use super::{is_identifier_part, Progress};
use crate::resource::ResourceType;

/// Something in Java or Kotlin source that may name a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceToken<'a> {
    /// `R.<type>.<name>` with a known resource type
    ResourceField {
        resource_type: ResourceType,
        name: &'a str,
    },
    /// Contents of a string literal, escapes uninterpreted
    StringLiteral(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Free,
    LineComment,
    BlockComment,
    Char,
    Str,
    RawStr,
}

/// Identifier scanner shared by Java and Kotlin
///
/// Comments, character literals and strings are tracked so that `R.` inside
/// them is not mistaken for code. `android.R.*` accesses are skipped because
/// they name framework resources.
#[derive(Debug)]
pub struct SourceScanner<'a> {
    text: &'a str,
    offset: usize,
    state: State,
    start: usize,
    progress: Progress,
}

impl<'a> SourceScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            state: State::Free,
            start: 0,
            progress: Progress::default(),
        }
    }

    fn identifier_end(&self, from: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut end = from;
        while end < bytes.len() && is_identifier_part(bytes[end]) {
            end += 1;
        }
        end
    }

    /// Identifier immediately before a `.` that precedes `offset`, if any
    fn qualifier_before(&self, offset: usize) -> Option<&'a str> {
        let bytes = self.text.as_bytes();
        let dot = offset.checked_sub(1)?;
        if bytes[dot] != b'.' {
            return None;
        }
        let mut start = dot;
        while start > 0 && is_identifier_part(bytes[start - 1]) {
            start -= 1;
        }
        Some(&self.text[start..dot])
    }

    /// Try to read `R.<type>.<name>` at an identifier `R` spanning `start..end`
    fn resource_field(&self, start: usize, end: usize) -> Option<(SourceToken<'a>, usize)> {
        let bytes = self.text.as_bytes();
        if &self.text[start..end] != "R" || bytes.get(end) != Some(&b'.') {
            return None;
        }
        if self.qualifier_before(start) == Some("android") {
            return None;
        }

        let type_start = end + 1;
        let type_end = self.identifier_end(type_start);
        if type_end == type_start || bytes.get(type_end) != Some(&b'.') {
            return None;
        }
        let resource_type = ResourceType::from_name(&self.text[type_start..type_end])?;

        let name_start = type_end + 1;
        let name_end = self.identifier_end(name_start);
        if name_end == name_start {
            return None;
        }

        let token = SourceToken::ResourceField {
            resource_type,
            name: &self.text[name_start..name_end],
        };
        Some((token, name_end))
    }
}

impl<'a> Iterator for SourceScanner<'a> {
    type Item = SourceToken<'a>;

    fn next(&mut self) -> Option<SourceToken<'a>> {
        let bytes = self.text.as_bytes();

        while self.offset < bytes.len() {
            self.offset = self.progress.check(self.offset);
            if self.offset >= bytes.len() {
                break;
            }
            let c = bytes[self.offset];
            let next = bytes.get(self.offset + 1).copied();

            match self.state {
                State::Free => {
                    if c == b'/' && next == Some(b'/') {
                        self.state = State::LineComment;
                        self.offset += 2;
                    } else if c == b'/' && next == Some(b'*') {
                        self.state = State::BlockComment;
                        self.offset += 2;
                    } else if c == b'\'' {
                        self.state = State::Char;
                        self.offset += 1;
                    } else if c == b'"' {
                        if bytes[self.offset..].starts_with(b"\"\"\"") {
                            self.state = State::RawStr;
                            self.offset += 3;
                        } else {
                            self.state = State::Str;
                            self.offset += 1;
                        }
                        self.start = self.offset;
                    } else if is_identifier_part(c) {
                        let start = self.offset;
                        let end = self.identifier_end(start);
                        if let Some((token, consumed)) = self.resource_field(start, end) {
                            self.offset = consumed;
                            return Some(token);
                        }
                        self.offset = end;
                    } else {
                        self.offset += 1;
                    }
                }
                State::LineComment => {
                    if c == b'\n' {
                        self.state = State::Free;
                    }
                    self.offset += 1;
                }
                State::BlockComment => {
                    if c == b'*' && next == Some(b'/') {
                        self.state = State::Free;
                        self.offset += 2;
                    } else {
                        self.offset += 1;
                    }
                }
                State::Char => {
                    if c == b'\\' {
                        self.offset = (self.offset + 2).min(bytes.len());
                    } else {
                        if c == b'\'' || c == b'\n' {
                            self.state = State::Free;
                        }
                        self.offset += 1;
                    }
                }
                State::Str => {
                    if c == b'\\' {
                        self.offset = (self.offset + 2).min(bytes.len());
                    } else if c == b'"' {
                        let literal = &self.text[self.start..self.offset];
                        self.state = State::Free;
                        self.offset += 1;
                        return Some(SourceToken::StringLiteral(literal));
                    } else {
                        self.offset += 1;
                    }
                }
                State::RawStr => {
                    if bytes[self.offset..].starts_with(b"\"\"\"") {
                        // extra quotes before the closing triple belong to the literal
                        let run = bytes[self.offset..].iter().take_while(|&&b| b == b'"').count();
                        let end = self.offset + run - 3;
                        let literal = &self.text[self.start..end];
                        self.state = State::Free;
                        self.offset += run;
                        return Some(SourceToken::StringLiteral(literal));
                    }
                    self.offset += 1;
                }
            }
        }

        None
    }
}
