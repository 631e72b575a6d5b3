#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub(crate) index: usize,
    pub(crate) start_ms: u64,
    pub(crate) end_ms: u64,
    pub(crate) text: Vec<String>,
}

impl Segment {
    /// The text lines joined with newlines.
    pub fn text(&self) -> String {
        self.text.join("\n")
    }
}
