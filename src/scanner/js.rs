use super::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Free,
    LineComment,
    BlockComment,
    Str(u8),
}

/// Yields the contents of every closed string literal in a script
///
/// Escapes are not interpreted: a backslash only makes the next byte part of
/// the literal.
#[derive(Debug)]
pub struct JsScanner<'a> {
    text: &'a str,
    offset: usize,
    state: State,
    start: usize,
    progress: Progress,
}

impl<'a> JsScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            state: State::Free,
            start: 0,
            progress: Progress::default(),
        }
    }
}

impl<'a> Iterator for JsScanner<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();

        while self.offset < bytes.len() {
            self.offset = self.progress.check(self.offset);
            if self.offset >= bytes.len() {
                break;
            }
            let c = bytes[self.offset];
            let next = bytes.get(self.offset + 1).copied();

            match self.state {
                State::Free => match (c, next) {
                    (b'/', Some(b'/')) => {
                        self.state = State::LineComment;
                        self.offset += 2;
                    }
                    (b'/', Some(b'*')) => {
                        self.state = State::BlockComment;
                        self.offset += 2;
                    }
                    (b'"' | b'\'', _) => {
                        self.state = State::Str(c);
                        self.offset += 1;
                        self.start = self.offset;
                    }
                    _ => self.offset += 1,
                },
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
                State::Str(quote) => {
                    if c == b'\\' {
                        self.offset = (self.offset + 2).min(bytes.len());
                    } else if c == quote {
                        let literal = &self.text[self.start..self.offset];
                        self.state = State::Free;
                        self.offset += 1;
                        return Some(literal);
                    } else {
                        self.offset += 1;
                    }
                }
            }
        }

        None
    }
}
