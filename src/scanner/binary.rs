use super::Progress;

/// Prefix of an embedded resource path, as in `file:///android_res/drawable/bg.png`
pub const RESOURCE_MARKER: &[u8] = b"android_res/";

fn is_path_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'/' | b'.' | b'-' | b'$')
}

/// Finds resource paths embedded in arbitrary bytes
///
/// Each yielded span is the path that follows [`RESOURCE_MARKER`], e.g.
/// `drawable/bg.png`. Works equally on decoded text via [`MarkerScanner::from_text`].
#[derive(Debug)]
pub struct MarkerScanner<'a> {
    bytes: &'a [u8],
    offset: usize,
    progress: Progress,
}

impl<'a> MarkerScanner<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            progress: Progress::default(),
        }
    }

    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }

    fn find_marker(&self) -> Option<usize> {
        self.bytes[self.offset..]
            .windows(RESOURCE_MARKER.len())
            .position(|window| window == RESOURCE_MARKER)
            .map(|pos| self.offset + pos)
    }
}

impl<'a> Iterator for MarkerScanner<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while self.offset < self.bytes.len() {
            self.offset = self.progress.check(self.offset);
            if self.offset >= self.bytes.len() {
                break;
            }

            let Some(marker) = self.find_marker() else {
                self.offset = self.bytes.len();
                break;
            };
            let start = marker + RESOURCE_MARKER.len();
            let mut end = start;
            while end < self.bytes.len() && is_path_byte(self.bytes[end]) {
                end += 1;
            }
            self.offset = end.max(marker + 1);

            // path bytes are ASCII so the span is always valid UTF-8
            if let Ok(path) = std::str::from_utf8(&self.bytes[start..end]) {
                if path.contains('/') {
                    return Some(path);
                }
            }
        }

        None
    }
}
