use serde::Serialize;

/// Byte range into the source text. `start <= end`; empty spans mark positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self { start, end }
    }

    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

pub fn merge_span(start: Span, end: Span) -> Span {
    Span {
        start: start.start.min(end.start),
        end: start.end.max(end.end),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticLabel {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub span: Span,
    pub labels: Vec<DiagnosticLabel>,
}

impl Diagnostic {
    pub fn error(code: &str, message: impl Into<String>, span: Span) -> Self {
        Self {
            code: code.to_string(),
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            span,
            labels: Vec::new(),
        }
    }

    pub fn with_label(mut self, message: impl Into<String>, span: Span) -> Self {
        self.labels.push(DiagnosticLabel {
            message: message.into(),
            span,
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDiagnostic {
    pub path: String,
    pub diagnostic: Diagnostic,
}

/// Offsets of every line start, for turning byte offsets into line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// 1-based line and column (columns count bytes).
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        Position {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    fn line_text<'a>(&self, source: &'a str, line: usize) -> &'a str {
        let Some(&start) = self.line_starts.get(line - 1) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        source.get(start..end).unwrap_or("").trim_end_matches('\r')
    }
}

pub fn render_diagnostics(path: &str, source: &str, diagnostics: &[Diagnostic]) -> String {
    let index = LineIndex::new(source);
    let mut output = String::new();
    for (i, diagnostic) in diagnostics.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&render_with_index(path, source, &index, diagnostic));
    }
    output
}

pub fn render_diagnostic(path: &str, source: &str, diagnostic: &Diagnostic) -> String {
    render_with_index(path, source, &LineIndex::new(source), diagnostic)
}

fn render_with_index(
    path: &str,
    source: &str,
    index: &LineIndex,
    diagnostic: &Diagnostic,
) -> String {
    let mut output = String::new();
    let start = index.position(diagnostic.span.start);
    let severity = match diagnostic.severity {
        DiagnosticSeverity::Error => "error",
    };
    output.push_str(&format!(
        "{severity}[{}] {}:{}:{} {}\n",
        diagnostic.code, path, start.line, start.column, diagnostic.message
    ));

    let text = index.line_text(source, start.line);
    output.push_str(&format!("{:>4} | {}\n", start.line, text));
    // Underline at least one column, clipped to the first line of the span.
    let end = index.position(diagnostic.span.end);
    let width = if end.line == start.line {
        (end.column - start.column).max(1)
    } else {
        (text.len() + 1).saturating_sub(start.column).max(1)
    };
    output.push_str(&format!(
        "     | {}{}\n",
        " ".repeat(start.column - 1),
        "^".repeat(width)
    ));

    for label in &diagnostic.labels {
        let pos = index.position(label.span.start);
        output.push_str(&format!(
            "  note: {} at {}:{}:{}\n",
            label.message, path, pos.line, pos.column
        ));
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets_to_one_based_positions() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.position(0), Position { line: 1, column: 1 });
        assert_eq!(index.position(2), Position { line: 1, column: 3 });
        assert_eq!(index.position(3), Position { line: 2, column: 1 });
        assert_eq!(index.position(6), Position { line: 3, column: 1 });
        assert_eq!(index.position(8), Position { line: 4, column: 2 });
        // Offsets past the end clamp to end-of-input.
        assert_eq!(index.position(100), Position { line: 4, column: 3 });
    }

    #[test]
    fn merge_span_takes_the_union() {
        let merged = merge_span(Span::new(4, 6), Span::new(1, 5));
        assert_eq!(merged, Span::new(1, 6));
        assert!(merged.contains(&Span::new(4, 6)));
        assert!(!Span::new(4, 6).contains(&merged));
    }

    #[test]
    fn render_points_at_the_span() {
        let source = "val x = 1\nval y = a + *\n";
        let diag = Diagnostic::error("E2001", "unexpected token `*`", Span::new(22, 23))
            .with_label("operator started here", Span::new(20, 21));
        let rendered = render_diagnostic("main.esc", source, &diag);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "error[E2001] main.esc:2:13 unexpected token `*`");
        assert_eq!(lines[1], "   2 | val y = a + *");
        assert_eq!(lines[2], "     |             ^");
        assert_eq!(lines[3], "  note: operator started here at main.esc:2:11");
    }

    #[test]
    fn diagnostics_serialize_as_errors() {
        let diag = Diagnostic::error("E1002", "invalid number literal `1x`", Span::new(0, 2));
        let json = serde_json::to_value(&diag).expect("serialize");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "E1002");
        assert_eq!(json["span"]["end"], 2);
    }

    #[test]
    fn render_joins_multiple_diagnostics() {
        let source = "a b c";
        let diags = vec![
            Diagnostic::error("E2002", "first", Span::new(2, 3)),
            Diagnostic::error("E2002", "second", Span::new(4, 5)),
        ];
        let rendered = render_diagnostics("x.esc", source, &diags);
        assert!(rendered.contains("x.esc:1:3 first"));
        assert!(rendered.contains("^\nerror[E2002] x.esc:1:5 second"));
    }
}
