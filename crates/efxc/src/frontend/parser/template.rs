//! EFX template line scanner
//!
//! Templates are line oriented, so they are not tokenized as a whole. The
//! scanner splits the source into logical lines, then cuts each line into an
//! outline number, a context declaration and content items. Embedded
//! expressions are handed to [`ExprParser`] with their source offset.

use super::expr::ExprParser;
use crate::common::{Span, TranslateError, TranslateResult};
use crate::frontend::ast::*;

/// A logical line: one physical line plus any continuation lines
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    /// 1-based number of the first physical line
    pub line: usize,
    /// Leading whitespace of the first physical line
    pub indent: String,
    pub indent_span: Span,
    /// Line text after the indentation, continuation lines joined
    pub text: String,
    /// (offset in `text`, offset in the source) for every joined segment
    segments: Vec<(usize, usize)>,
}

impl RawLine {
    /// Map an offset in `text` back to the template source
    pub fn source_offset(&self, pos: usize) -> usize {
        let (logical, source) = self
            .segments
            .iter()
            .rev()
            .find(|(logical, _)| *logical <= pos)
            .copied()
            .unwrap_or((0, self.indent_span.end));
        source + (pos - logical)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.source_offset(start), self.source_offset(end))
    }

    pub fn text_span(&self) -> Span {
        self.span(0, self.text.len())
    }
}

/// Split a template into logical lines
///
/// Blank lines and comment-only lines are dropped. A line ending in an
/// unescaped `\` is joined with the next one, whose indentation is ignored.
pub fn scan_lines(source: &str) -> Vec<RawLine> {
    let mut lines = Vec::new();
    let mut pending: Option<RawLine> = None;
    let mut offset = 0;

    for (index, physical) in source.split('\n').enumerate() {
        let line_start = offset;
        offset += physical.len() + 1;
        let physical = physical.strip_suffix('\r').unwrap_or(physical);

        let body = physical.trim_start_matches([' ', '\t']);
        let indent_len = physical.len() - body.len();
        let (body, continued) = match body.strip_suffix('\\') {
            Some(stripped) if trailing_backslashes(body) % 2 == 1 => (stripped, true),
            _ => (body, false),
        };

        let mut line = match pending.take() {
            Some(mut line) => {
                line.segments.push((line.text.len(), line_start + indent_len));
                line.text.push_str(body);
                line
            }
            None => {
                if !continued && is_blank(body) {
                    continue;
                }
                RawLine {
                    line: index + 1,
                    indent: physical[..indent_len].to_string(),
                    indent_span: Span::new(line_start, line_start + indent_len),
                    text: body.to_string(),
                    segments: vec![(0, line_start + indent_len)],
                }
            }
        };

        if continued {
            pending = Some(line);
        } else {
            line.text.truncate(line.text.trim_end().len());
            lines.push(line);
        }
    }

    if let Some(mut line) = pending {
        line.text.truncate(line.text.trim_end().len());
        if !is_blank(&line.text) {
            lines.push(line);
        }
    }
    lines
}

fn trailing_backslashes(text: &str) -> usize {
    text.chars().rev().take_while(|c| *c == '\\').count()
}

fn is_blank(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.starts_with("//")
}

/// Parse one logical line at the given depth
pub fn parse_line(raw: &RawLine, depth: usize) -> TranslateResult<TemplateLine> {
    let mut scanner = LineScanner { raw, pos: 0 };
    let outline = scanner.scan_outline()?;
    let context = scanner.scan_context()?;
    let content = scanner.scan_content()?;
    Ok(TemplateLine {
        line: raw.line,
        depth,
        outline,
        context,
        content,
        span: raw.text_span(),
    })
}

/// Parse an expression-mode input: `{context} ${expression}`
pub fn parse_expression_input(source: &str) -> TranslateResult<(Option<ContextDecl>, Expr)> {
    let lines = scan_lines(source);
    let Some(raw) = lines.first() else {
        return Err(TranslateError::syntax("empty input", Span::new(0, 0)));
    };
    if lines.len() > 1 {
        return Err(TranslateError::syntax(
            "an expression must fit on a single logical line",
            lines[1].text_span(),
        ));
    }

    let line = parse_line(raw, 0)?;
    if line.outline.is_some() {
        return Err(TranslateError::syntax("unexpected outline number", line.span));
    }
    let mut content = line.content.into_iter();
    match (content.next(), content.next()) {
        (Some(ContentItem::Expression(expr)), None) => Ok((line.context, expr)),
        _ => Err(TranslateError::syntax(
            "expected a single ${...} expression after the context",
            line.span,
        )),
    }
}

struct LineScanner<'a> {
    raw: &'a RawLine,
    pos: usize,
}

impl LineScanner<'_> {
    fn rest(&self) -> &str {
        &self.raw.text[self.pos..]
    }

    fn span(&self, start: usize, end: usize) -> Span {
        self.raw.span(start, end)
    }

    /// `2{`, `0{`, `4.2{`
    fn scan_outline(&mut self) -> TranslateResult<Option<OutlineOverride>> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if len == 0 || !rest[len..].starts_with('{') {
            return Ok(None);
        }

        let text = &rest[..len];
        let span = self.span(self.pos, self.pos + len);
        let mut segments = Vec::new();
        for part in text.split('.') {
            let number = part.parse::<u32>().map_err(|_| {
                TranslateError::syntax(format!("invalid outline number '{}'", text), span)
            })?;
            segments.push(number);
        }
        self.pos += len;

        if segments == [0] {
            Ok(Some(OutlineOverride::Suppressed))
        } else {
            Ok(Some(OutlineOverride::Number(segments)))
        }
    }

    fn scan_context(&mut self) -> TranslateResult<Option<ContextDecl>> {
        if !self.rest().starts_with('{') {
            return Ok(None);
        }
        let open = self.pos;
        let close = self.find_closing(open)?;
        let inner = &self.raw.text[open + 1..close];
        let decl = ExprParser::with_offset(inner, self.raw.source_offset(open + 1))
            .parse_context_decl()?;
        self.pos = close + 1;
        Ok(Some(decl))
    }

    /// Index of the `}` matching the `{` at `open`, skipping quoted strings
    fn find_closing(&self, open: usize) -> TranslateResult<usize> {
        let text = &self.raw.text;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        for (index, c) in text[open..].char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => quote = Some(c),
                (None, '{') => depth += 1,
                (None, '}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(open + index);
                    }
                }
                _ => {}
            }
        }
        Err(TranslateError::syntax(
            "missing closing '}'",
            self.span(open, text.len()),
        ))
    }

    fn scan_content(&mut self) -> TranslateResult<Vec<ContentItem>> {
        let mut items = Vec::new();
        let mut text = String::new();
        let mut after_placeholder = false;

        // Whitespace between the context and the content is not content
        let trimmed = self.rest().trim_start().len();
        self.pos = self.raw.text.len() - trimmed;

        while let Some(c) = self.rest().chars().next() {
            let start = self.pos;
            let rest = self.rest();

            if c == '\\' {
                let escaped = rest[1..].chars().next();
                match escaped {
                    Some(escaped) => {
                        text.push(escaped);
                        self.pos += 1 + escaped.len_utf8();
                    }
                    None => self.pos += 1,
                }
                after_placeholder = false;
            } else if rest.starts_with("//") {
                break;
            } else if rest.starts_with("${") {
                flush_text(&mut items, &mut text);
                let close = self.find_closing(start + 1)?;
                let inner = &self.raw.text[start + 2..close];
                let expr = ExprParser::with_offset(inner, self.raw.source_offset(start + 2)).parse()?;
                items.push(ContentItem::Expression(expr));
                self.pos = close + 1;
                after_placeholder = true;
            } else if rest.starts_with("#{") {
                flush_text(&mut items, &mut text);
                let close = self.find_closing(start + 1)?;
                let label = self.scan_label(start, close)?;
                items.push(ContentItem::Label(label));
                self.pos = close + 1;
                after_placeholder = true;
            } else if let Some(len) = value_shorthand(rest, '#') {
                flush_text(&mut items, &mut text);
                let span = self.span(start, start + len);
                items.push(ContentItem::Label(LabelRef {
                    parts: vec![LabelPart::Text {
                        value: "value".to_string(),
                        span: self.span(start + 1, start + len),
                    }],
                    span,
                }));
                self.pos += len;
                after_placeholder = true;
            } else if let Some(len) = value_shorthand(rest, '$') {
                flush_text(&mut items, &mut text);
                items.push(ContentItem::ContextValue(self.span(start, start + len)));
                self.pos += len;
                after_placeholder = true;
            } else if after_placeholder && c.is_whitespace() {
                let len = rest
                    .find(|c: char| !c.is_whitespace())
                    .unwrap_or(rest.len());
                items.push(ContentItem::Whitespace(rest[..len].to_string()));
                self.pos += len;
                after_placeholder = false;
            } else {
                text.push(c);
                self.pos += c.len_utf8();
                after_placeholder = false;
            }
        }

        text.truncate(text.trim_end().len());
        flush_text(&mut items, &mut text);
        if matches!(items.last(), Some(ContentItem::Whitespace(_))) {
            items.pop();
        }
        Ok(items)
    }

    /// Split `#{a|b|${expr}}` into its parts
    fn scan_label(&self, start: usize, close: usize) -> TranslateResult<LabelRef> {
        let span = self.span(start, close + 1);
        let inner_start = start + 2;
        let inner = &self.raw.text[inner_start..close];

        let mut parts = Vec::new();
        let mut part_start = 0;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        for (index, c) in inner.char_indices().chain(std::iter::once((inner.len(), '|'))) {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => quote = Some(c),
                (None, '{') => depth += 1,
                (None, '}') => depth = depth.saturating_sub(1),
                (None, '|') if depth == 0 => {
                    parts.push(self.label_part(inner, inner_start, part_start, index)?);
                    part_start = index + 1;
                }
                _ => {}
            }
        }
        Ok(LabelRef { parts, span })
    }

    fn label_part(
        &self,
        inner: &str,
        inner_start: usize,
        from: usize,
        to: usize,
    ) -> TranslateResult<LabelPart> {
        let raw = &inner[from..to];
        let leading = raw.len() - raw.trim_start().len();
        let value = raw.trim();
        let start = inner_start + from + leading;
        let span = self.span(start, start + value.len());

        if value.is_empty() {
            return Err(TranslateError::syntax("empty label part", span));
        }
        if let Some(expr) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
            let parsed = ExprParser::with_offset(expr, self.raw.source_offset(start + 2)).parse()?;
            return Ok(LabelPart::Expression(parsed));
        }
        if value.contains(['$', '{', '}']) {
            return Err(TranslateError::syntax(
                format!("invalid label part '{}'", value),
                span,
            ));
        }
        Ok(LabelPart::Text {
            value: value.to_string(),
            span,
        })
    }
}

/// Length of `#value` / `$value` at the start of `rest`, if present
fn value_shorthand(rest: &str, sigil: char) -> Option<usize> {
    let after = rest.strip_prefix(sigil)?.strip_prefix("value")?;
    let continues = after
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if continues { None } else { Some(1 + "value".len()) }
}

fn flush_text(items: &mut Vec<ContentItem>, text: &mut String) {
    if !text.is_empty() {
        items.push(ContentItem::Text(std::mem::take(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(source: &str) -> TemplateLine {
        let lines = scan_lines(source);
        assert_eq!(lines.len(), 1);
        parse_line(&lines[0], 0).unwrap()
    }

    #[test]
    fn test_scan_skips_blank_and_comment_lines() {
        let lines = scan_lines("{BT-00-Text} foo\n\n   \n// note\n\t{ND-Root} bar\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 1);
        assert_eq!(lines[1].line, 5);
        assert_eq!(lines[1].indent, "\t");
        assert_eq!(lines[1].text, "{ND-Root} bar");
    }

    #[test]
    fn test_continuation_joins_lines() {
        let source = "{BT-00-Text} foo \\\n      bar\n{ND-Root} baz";
        let lines = scan_lines(source);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "{BT-00-Text} foo bar");
        assert_eq!(lines[1].line, 3);
        // "bar" starts after the six spaces of the second physical line
        assert_eq!(lines[0].source_offset(17), 25);
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let lines = scan_lines("{BT-00-Text} foo\\\\\n{BT-00-Text} bar");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_outline_and_context() {
        let line = single("2{BT-00-Text} foo");
        assert_eq!(line.outline, Some(OutlineOverride::Number(vec![2])));
        let context = line.context.unwrap();
        assert!(matches!(
            context.reference.kind,
            ExprKind::Reference(ref r) if r.target.id == "BT-00-Text"
        ));
        assert_eq!(line.content, vec![ContentItem::Text("foo".into())]);

        assert_eq!(single("0{ND-Root} x").outline, Some(OutlineOverride::Suppressed));
        assert_eq!(
            single("4.2{ND-Root} x").outline,
            Some(OutlineOverride::Number(vec![4, 2]))
        );
    }

    #[test]
    fn test_digits_without_context_are_text() {
        let line = single("2024 was a year");
        assert_eq!(line.outline, None);
        assert_eq!(line.context, None);
        assert_eq!(line.content, vec![ContentItem::Text("2024 was a year".into())]);
    }

    #[test]
    fn test_whitespace_after_placeholders() {
        let line = single("{BT-00-Code} blah #value blah $value blah");
        assert!(matches!(
            line.content.as_slice(),
            [
                ContentItem::Text(a),
                ContentItem::Label(_),
                ContentItem::Whitespace(w1),
                ContentItem::Text(b),
                ContentItem::ContextValue(_),
                ContentItem::Whitespace(w2),
                ContentItem::Text(c),
            ] if a == "blah " && w1 == " " && b == "blah " && w2 == " " && c == "blah"
        ));
    }

    #[test]
    fn test_comment_and_trailing_whitespace() {
        let line = single("{ND-Root} #{name|BT-00-Text} blah blah // comment blah blah");
        assert_eq!(line.content.len(), 3);
        assert_eq!(line.content[2], ContentItem::Text("blah blah".into()));
    }

    #[test]
    fn test_label_parts() {
        let line = single("{BT-00-Text}  #{field|name|${BT-00-Text}}");
        let [ContentItem::Label(label)] = line.content.as_slice() else {
            panic!("expected a single label");
        };
        assert_eq!(label.parts.len(), 3);
        assert_eq!(label.parts[0].as_text(), Some("field"));
        assert_eq!(label.parts[1].as_text(), Some("name"));
        assert!(matches!(label.parts[2], LabelPart::Expression(_)));
    }

    #[test]
    fn test_escapes() {
        let line = single("{ND-Root} costs \\$5 \\#{not a label}");
        assert_eq!(line.content, vec![ContentItem::Text("costs $5 #{not a label}".into())]);
    }

    #[test]
    fn test_expression_spans_point_into_source() {
        let source = "{ND-Root}\n\t{BT-00-Text} ${$x}";
        let lines = scan_lines(source);
        let line = parse_line(&lines[1], 1).unwrap();
        let [ContentItem::Expression(expr)] = line.content.as_slice() else {
            panic!("expected an expression");
        };
        assert_eq!(&source[expr.span.start..expr.span.end], "$x");
    }

    #[test]
    fn test_context_with_variables() {
        let line = single("{BT-00-Text, text:$x = 'a'} ${$x}");
        assert_eq!(line.context.unwrap().variables.len(), 1);
    }

    #[test]
    fn test_unterminated_placeholder() {
        let lines = scan_lines("{BT-00-Text} ${BT-00-Text");
        assert!(matches!(parse_line(&lines[0], 0), Err(TranslateError::Syntax { .. })));
    }

    #[test]
    fn test_expression_input() {
        let (context, expr) = parse_expression_input("{BT-00-Text} ${1 + 2}").unwrap();
        assert!(context.is_some());
        assert!(matches!(expr.kind, ExprKind::Binary { op: BinOp::Add, .. }));
        assert!(parse_expression_input("{BT-00-Text} foo").is_err());
    }
}
