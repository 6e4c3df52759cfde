use serde_json::Value;

/// A scrollable block of read-only text.
#[derive(Debug, Clone, Default)]
pub struct DetailView {
    pub title: String,
    lines: Vec<String>,
    scroll: usize,
}

impl DetailView {
    pub fn new(title: impl Into<String>, text: &str) -> Self {
        Self { title: title.into(), lines: text.lines().map(str::to_string).collect(), scroll: 0 }
    }

    /// Render an untyped document as YAML, keeping its key order.
    pub fn from_document(title: impl Into<String>, document: &Value) -> Self {
        let text = serde_yaml::to_string(document).unwrap_or_else(|e| format!("failed to render document: {e}"));
        Self::new(title, &text)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn scroll_home(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_end(&mut self) {
        self.scroll = self.lines.len().saturating_sub(1);
    }
}
