use crate::ast::Span;
use std::fmt;
use std::path::PathBuf;

/// Kind of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidSyntax,
    MissingToken,
    MissingPackage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidSyntax => "Invalid syntax",
            ErrorKind::MissingToken => "Missing token",
            ErrorKind::MissingPackage => "Missing package clause",
        }
    }
}

/// Error during parsing
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            help: None,
        }
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        let line = self.span.start.line + 1;
        let col = self.span.start.col + 1;
        output.push_str(&format!(" {}file:{} {}:{}:{}\n", dim, reset, filename, line, col));
        output.push_str(&format!("{}error:{} {}\n", red, reset, self.message));

        if let Some(source_line) = source.lines().nth(self.span.start.line) {
            let line_num_width = format!("{}", line).len().max(2);
            let shown = if color { highlight_keywords(source_line) } else { source_line.to_string() };
            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = line_num_width));
            output.push_str(&format!("{}{:>width$} |{} {}\n", dim, line, reset, shown, width = line_num_width));

            let underline_start = self.span.start.col;
            let underline_len = if self.span.end.line == self.span.start.line {
                (self.span.end.col.saturating_sub(self.span.start.col)).max(1)
            } else {
                source_line.chars().count().saturating_sub(underline_start).max(1)
            };

            let spaces = " ".repeat(underline_start);
            let carets = "^".repeat(underline_len);
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}{}{}\n",
                dim, "", reset,
                spaces, red, carets, reset,
                width = line_num_width
            ));
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help_line));
                } else {
                    output.push_str(&format!("       {}\n", help_line));
                }
            }
        }

        output.push('\n');
        output
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Everything that can stop a rewrite. All of these are raised before the
/// file on disk is touched.
#[derive(Debug, thiserror::Error)]
pub enum MockableError {
    /// Bad or missing naming input
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("file {name} not found in {}", dir.display())]
    FileNotFound { name: String, dir: PathBuf },

    #[error("expected a single package, found {}", packages.join(", "))]
    MultiplePackages { packages: Vec<String> },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("parameter `{param}` of {function} clashes with the receiver name `{param}`")]
    ReceiverConflict { function: String, param: String },

    #[error("{name} is already declared in this file")]
    NameCollision { name: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MockableError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MockableError::Io {
            path: path.into(),
            source,
        }
    }

    /// Render the error, with source context for parse errors
    pub fn render(&self, source: &str, filename: &str) -> String {
        match self {
            MockableError::Parse(err) => err.render(source, filename),
            other => format!("error: {}\n", other),
        }
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        match self {
            MockableError::Parse(err) => err.render_color(source, filename),
            other => format!("\x1b[1;31merror\x1b[0m: \x1b[1m{}\x1b[0m\n", other),
        }
    }
}

/// Highlight Go keywords in a source line
fn highlight_keywords(line: &str) -> String {
    const KEYWORD: &str = "\x1b[38;5;173m";
    const RESET: &str = "\x1b[0m";
    const KEYWORDS: &[&str] = &[
        "break", "case", "chan", "const", "continue", "default", "defer", "else",
        "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
        "map", "package", "range", "return", "select", "struct", "switch", "type", "var",
    ];

    let mut result = String::with_capacity(line.len());
    let mut word = String::new();
    let flush = |word: &mut String, result: &mut String| {
        if KEYWORDS.contains(&word.as_str()) {
            result.push_str(KEYWORD);
            result.push_str(word);
            result.push_str(RESET);
        } else {
            result.push_str(word);
        }
        word.clear();
    };

    for c in line.chars() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
        } else {
            flush(&mut word, &mut result);
            result.push(c);
        }
    }
    flush(&mut word, &mut result);
    result
}
