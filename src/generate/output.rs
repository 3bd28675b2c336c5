/// Output buffer that accumulates generated Go code line by line
pub struct Output {
    lines: Vec<String>,
    current_line: String,
}

impl Output {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            current_line: String::new(),
        }
    }

    /// Add text to the current line
    pub fn push(&mut self, text: &str) {
        self.current_line.push_str(text);
    }

    /// Add a full line, indented with tabs the way gofmt does
    pub fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.current_line.push('\t');
        }
        self.current_line.push_str(text);
        self.newline();
    }

    /// Add a newline
    pub fn newline(&mut self) {
        self.lines.push(std::mem::take(&mut self.current_line));
    }

    /// Finish and return the generated code, without a trailing newline
    pub fn finish(mut self) -> String {
        if !self.current_line.is_empty() {
            self.lines.push(std::mem::take(&mut self.current_line));
        }
        self.lines.join("\n")
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_tab_indented() {
        let mut out = Output::new();
        out.push("func F() {");
        out.newline();
        out.line(1, "return");
        out.push("}");
        assert_eq!(out.finish(), "func F() {\n\treturn\n}");
    }
}
