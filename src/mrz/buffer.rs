/// Bounded buffer of recently typed characters.
///
/// Fields are addressed relative to the end of the buffer, which is where an MRZ line that has
/// just been typed ends.
#[derive(Debug, Clone)]
pub(super) struct ScanBuffer {
    chars: Vec<char>,
    capacity: usize,
    last_write: Option<u64>,
}

impl ScanBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            chars: Vec::with_capacity(capacity),
            capacity,
            last_write: None,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn reset(&mut self) {
        self.chars.clear();
    }

    /// Milliseconds since the last write, or `None` before the first write.
    pub fn idle_for(&self, now: u64) -> Option<u64> {
        self.last_write.map(|last| now.saturating_sub(last))
    }

    /// Append a character, starting over if the buffer is full.
    pub fn push(&mut self, c: char, now: u64) {
        if self.chars.len() >= self.capacity {
            self.reset();
        }
        self.chars.push(c);
        self.last_write = Some(now);
    }

    /// The character `offset` positions before the end (`offset` 1 is the last character).
    pub fn char_from_end(&self, offset: usize) -> Option<char> {
        let start = self.chars.len().checked_sub(offset)?;
        self.chars.get(start).copied()
    }

    /// `width` characters starting `offset` positions before the end.
    pub fn field_from_end(&self, offset: usize, width: usize) -> Option<String> {
        let start = self.chars.len().checked_sub(offset)?;
        self.chars
            .get(start..start.checked_add(width)?)
            .map(|field| field.iter().collect())
    }
}
