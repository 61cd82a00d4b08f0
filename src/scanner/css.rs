use super::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Free,
    Comment,
}

/// Yields the argument of every `url(...)` in a style sheet
///
/// Surrounding whitespace and one layer of matching quotes are stripped.
#[derive(Debug)]
pub struct CssScanner<'a> {
    text: &'a str,
    offset: usize,
    state: State,
    progress: Progress,
}

impl<'a> CssScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            state: State::Free,
            progress: Progress::default(),
        }
    }
}

/// Strip whitespace and a single pair of matching quotes
fn unquote(value: &str) -> &str {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return value[1..value.len() - 1].trim();
        }
    }
    value
}

impl<'a> Iterator for CssScanner<'a> {
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
                State::Free => {
                    if c == b'/' && next == Some(b'*') {
                        self.state = State::Comment;
                        self.offset += 2;
                    } else if bytes
                        .get(self.offset..self.offset + 4)
                        .is_some_and(|b| b.eq_ignore_ascii_case(b"url("))
                    {
                        let start = self.offset + 4;
                        let Some(close) = self.text[start..].find(')') else {
                            self.offset = bytes.len();
                            break;
                        };
                        let value = unquote(&self.text[start..start + close]);
                        self.offset = start + close + 1;
                        if !value.is_empty() {
                            return Some(value);
                        }
                    } else {
                        self.offset += 1;
                    }
                }
                State::Comment => {
                    if c == b'*' && next == Some(b'/') {
                        self.state = State::Free;
                        self.offset += 2;
                    } else {
                        self.offset += 1;
                    }
                }
            }
        }

        None
    }
}
