use super::{find_ignore_case, CssScanner, JsScanner, Progress};

/// Something in a web document that may name a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebToken<'a> {
    /// `href`/`src` attribute value or style sheet `url(...)`
    Url(&'a str),
    /// String literal inside a `<script>` block
    StringLiteral(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    TagName,
    InTag,
    AttrName,
    AfterAttrName,
    BeforeAttrValue,
    AttrValue(Option<u8>),
    CloseTag,
}

/// Body of a `<script>` or `<style>` element being drained
#[derive(Debug)]
enum Embedded<'a> {
    Script(JsScanner<'a>),
    Style(CssScanner<'a>),
}

/// Markup tokenizer for HTML-like documents
///
/// Comments and CDATA sections are skipped verbatim. `<script>` and `<style>`
/// bodies are handed to [`JsScanner`] and [`CssScanner`] and their tokens are
/// yielded in document order.
#[derive(Debug)]
pub struct HtmlScanner<'a> {
    text: &'a str,
    offset: usize,
    state: State,
    progress: Progress,

    tag: &'a str,
    self_closing: bool,
    attr_name: &'a str,
    mark: usize,

    embedded: Option<Embedded<'a>>,
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b':' | b'.')
}

impl<'a> HtmlScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            state: State::Text,
            progress: Progress::default(),
            tag: "",
            self_closing: false,
            attr_name: "",
            mark: 0,
            embedded: None,
        }
    }

    fn starts_with_at(&self, offset: usize, needle: &str) -> bool {
        self.text.as_bytes()[offset..].starts_with(needle.as_bytes())
    }

    /// Skip to just past `terminator`, or to the end of input
    fn skip_past(&mut self, terminator: &str) {
        self.offset = match self.text[self.offset..].find(terminator) {
            Some(pos) => self.offset + pos + terminator.len(),
            None => self.text.len(),
        };
        self.state = State::Text;
    }

    /// Handle one byte while between attributes
    fn in_tag(&mut self, c: u8) {
        match c {
            b'>' => self.finish_tag(),
            b'/' => {
                self.self_closing = true;
                self.offset += 1;
            }
            c if is_name_byte(c) => {
                self.state = State::AttrName;
                self.mark = self.offset;
                self.offset += 1;
            }
            _ => self.offset += 1,
        }
    }

    /// Consume the `>` of an opening tag and start draining an embedded body
    fn finish_tag(&mut self) {
        self.offset += 1;
        self.state = State::Text;

        if self.self_closing {
            return;
        }

        let (close_tag, is_script) = if self.tag.eq_ignore_ascii_case("script") {
            ("</script", true)
        } else if self.tag.eq_ignore_ascii_case("style") {
            ("</style", false)
        } else {
            return;
        };

        let end = find_ignore_case(self.text, self.offset, close_tag).unwrap_or(self.text.len());
        let body = &self.text[self.offset..end];
        self.embedded = Some(if is_script {
            Embedded::Script(JsScanner::new(body))
        } else {
            Embedded::Style(CssScanner::new(body))
        });
        self.offset = end;
    }

    fn attribute_token(&self, value: &'a str) -> Option<WebToken<'a>> {
        let is_url = self.attr_name.eq_ignore_ascii_case("href")
            || self.attr_name.eq_ignore_ascii_case("src");
        let value = value.trim();
        if is_url && !value.is_empty() {
            Some(WebToken::Url(value))
        } else {
            None
        }
    }

    fn next_embedded(&mut self) -> Option<WebToken<'a>> {
        let token = match self.embedded.as_mut()? {
            Embedded::Script(scanner) => scanner.next().map(WebToken::StringLiteral),
            Embedded::Style(scanner) => scanner.next().map(WebToken::Url),
        };
        if token.is_none() {
            self.embedded = None;
        }
        token
    }
}

impl<'a> Iterator for HtmlScanner<'a> {
    type Item = WebToken<'a>;

    fn next(&mut self) -> Option<WebToken<'a>> {
        if let Some(token) = self.next_embedded() {
            return Some(token);
        }

        let bytes = self.text.as_bytes();

        while self.offset < bytes.len() {
            self.offset = self.progress.check(self.offset);
            if self.offset >= bytes.len() {
                break;
            }
            let c = bytes[self.offset];

            match self.state {
                State::Text => {
                    if c != b'<' {
                        self.offset += 1;
                    } else if self.starts_with_at(self.offset, "<!--") {
                        self.offset += 4;
                        self.skip_past("-->");
                    } else if self.starts_with_at(self.offset, "<![CDATA[") {
                        self.offset += 9;
                        self.skip_past("]]>");
                    } else {
                        match bytes.get(self.offset + 1) {
                            Some(b'/') => {
                                self.state = State::CloseTag;
                                self.offset += 2;
                            }
                            Some(n) if n.is_ascii_alphabetic() => {
                                self.state = State::TagName;
                                self.self_closing = false;
                                self.offset += 1;
                                self.mark = self.offset;
                            }
                            // `<!DOCTYPE`, `<?xml` and stray `<`
                            _ => self.offset += 1,
                        }
                    }
                }
                State::CloseTag => {
                    if c == b'>' {
                        self.state = State::Text;
                    }
                    self.offset += 1;
                }
                State::TagName => {
                    if is_name_byte(c) {
                        self.offset += 1;
                    } else {
                        self.tag = &self.text[self.mark..self.offset];
                        self.state = State::InTag;
                        self.in_tag(c);
                    }
                }
                State::InTag => self.in_tag(c),
                State::AttrName => {
                    if is_name_byte(c) {
                        self.offset += 1;
                    } else {
                        self.attr_name = &self.text[self.mark..self.offset];
                        if c == b'=' {
                            self.state = State::BeforeAttrValue;
                            self.offset += 1;
                        } else if c.is_ascii_whitespace() {
                            self.state = State::AfterAttrName;
                            self.offset += 1;
                        } else {
                            self.state = State::InTag;
                            self.in_tag(c);
                        }
                    }
                }
                State::AfterAttrName => {
                    if c.is_ascii_whitespace() {
                        self.offset += 1;
                    } else if c == b'=' {
                        self.state = State::BeforeAttrValue;
                        self.offset += 1;
                    } else {
                        self.state = State::InTag;
                        self.in_tag(c);
                    }
                }
                State::BeforeAttrValue => {
                    if c.is_ascii_whitespace() {
                        self.offset += 1;
                    } else if c == b'"' || c == b'\'' {
                        self.state = State::AttrValue(Some(c));
                        self.offset += 1;
                        self.mark = self.offset;
                    } else if c == b'>' {
                        self.finish_tag();
                    } else {
                        self.state = State::AttrValue(None);
                        self.mark = self.offset;
                        self.offset += 1;
                    }
                }
                State::AttrValue(Some(quote)) => {
                    if c == quote {
                        let value = &self.text[self.mark..self.offset];
                        self.state = State::InTag;
                        self.offset += 1;
                        if let Some(token) = self.attribute_token(value) {
                            return Some(token);
                        }
                    } else {
                        self.offset += 1;
                    }
                }
                State::AttrValue(None) => {
                    if c.is_ascii_whitespace() || c == b'>' {
                        let value = &self.text[self.mark..self.offset];
                        let token = self.attribute_token(value);
                        self.state = State::InTag;
                        if c == b'>' {
                            self.finish_tag();
                        } else {
                            self.offset += 1;
                        }
                        if token.is_some() {
                            return token;
                        }
                    } else {
                        self.offset += 1;
                    }
                }
            }

            if let Some(token) = self.next_embedded() {
                return Some(token);
            }
        }

        None
    }
}
