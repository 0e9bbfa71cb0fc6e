use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::model::{value_kind, CalendarDocument, Component, Parameter, Property, Value, ValueKind};

/// A single unfolded `name;params:value` line, before value decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentLine {
    pub name: String,
    pub params: Vec<Parameter>,
    pub raw_value: String,
}

/// Parses a complete `VCALENDAR` document
///
/// Returns a [`ParseError`] for empty input, malformed content lines,
/// unterminated or mismatched components, a `VERSION` other than `2.0`,
/// or content after `END:VCALENDAR`
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<CalendarDocument> {
    let lines = split_lines(input);
    let Some((first_line, _)) = lines.first() else {
        return Err(ParseError::new(ParseErrorKind::EmptyInput, 1));
    };
    let first_line = *first_line;

    tracing::debug!(count = lines.len(), "Split content lines");

    let mut iter = lines.into_iter();
    let root = match iter.next() {
        Some((line_num, line)) => {
            let content = parse_content_line(&line, line_num)?;
            if content.name != "BEGIN" || !content.raw_value.eq_ignore_ascii_case("VCALENDAR") {
                return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num)
                    .with_context("expected BEGIN:VCALENDAR"));
            }
            Component::new("VCALENDAR")
        }
        None => return Err(ParseError::new(ParseErrorKind::EmptyInput, first_line)),
    };

    // Open components, innermost last.
    let mut stack: Vec<Component> = vec![root];
    let mut last_line = first_line;
    let mut finished: Option<Component> = None;

    for (line_num, line) in iter {
        last_line = line_num;
        if finished.is_some() {
            return Err(ParseError::new(ParseErrorKind::TrailingContent, line_num));
        }

        let content = parse_content_line(&line, line_num)?;
        match content.name.as_str() {
            "BEGIN" => stack.push(Component::new(&content.raw_value)),
            "END" => {
                let end_name = content.raw_value.to_ascii_uppercase();
                let Some(open) = stack.pop() else {
                    return Err(ParseError::new(ParseErrorKind::MismatchedComponent, line_num));
                };
                if open.name != end_name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num)
                            .with_context(format!("expected END:{}, got END:{}", open.name, end_name)),
                    );
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(open),
                    None => finished = Some(open),
                }
            }
            _ => {
                let property = into_property(content);
                if let Some(current) = stack.last_mut() {
                    current.push(property);
                }
            }
        }
    }

    let Some(root) = finished else {
        let open = stack
            .last()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "VCALENDAR".to_string());
        tracing::warn!(component = %open, "Calendar document is not terminated");
        return Err(ParseError::new(ParseErrorKind::MissingEnd, last_line)
            .with_context(format!("missing END:{open}")));
    };

    let document = CalendarDocument {
        properties: root.properties,
        components: root.children,
    };

    if let Some(version) = document.version() {
        if version.trim() != "2.0" {
            return Err(ParseError::new(ParseErrorKind::UnsupportedVersion, first_line)
                .with_context(format!("VERSION:{version}")));
        }
    }

    tracing::debug!(
        components = document.components.len(),
        events = document.events().count(),
        "Calendar document parsed"
    );

    Ok(document)
}

/// Splits input into unfolded content lines, tagged with their 1-based
/// starting line number
///
/// Accepts CRLF or bare LF. A line starting with SPACE or HTAB continues the
/// previous line; the line break and that one whitespace character are
/// removed. Blank lines are skipped
pub(crate) fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some((_, prev)) = lines.last_mut() {
                prev.push_str(continuation);
                continue;
            }
        }
        lines.push((i + 1, line.to_string()));
    }

    lines
}

/// Parses one unfolded content line: `name *(";" param) ":" value`
pub(crate) fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let name_end = line
        .find([';', ':'])
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num))?;

    if name_end == 0 {
        return Err(ParseError::new(ParseErrorKind::MissingPropertyName, line_num));
    }

    let name = &line[..name_end];
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(ParseErrorKind::InvalidPropertyName, line_num)
            .with_context(name.to_string()));
    }

    let mut params = Vec::new();
    let mut rest = &line[name_end..];
    while let Some(after_semicolon) = rest.strip_prefix(';') {
        let (param, remaining) = parse_parameter(after_semicolon, line_num)?;
        params.push(param);
        rest = remaining;
    }

    let raw_value = rest
        .strip_prefix(':')
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num))?;

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        raw_value: raw_value.to_string(),
    })
}

/// Parses `NAME=value[,value...]` and returns the rest of the line, which
/// starts at the `;` or `:` that ended the parameter
fn parse_parameter(input: &str, line_num: usize) -> ParseResult<(Parameter, &str)> {
    let eq = input
        .find('=')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidParameter, line_num))?;
    let name = &input[..eq];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(ParseErrorKind::InvalidParameter, line_num)
            .with_context(format!("bad parameter name '{name}'")));
    }

    let mut values = Vec::new();
    let mut rest = &input[eq + 1..];
    loop {
        let (value, remaining) = parse_param_value(rest, line_num)?;
        values.push(value);
        match remaining.chars().next() {
            Some(',') => rest = &remaining[1..],
            Some(';') | Some(':') => {
                return Ok((
                    Parameter {
                        name: name.to_ascii_uppercase(),
                        values,
                    },
                    remaining,
                ));
            }
            Some(c) => {
                return Err(ParseError::new(ParseErrorKind::InvalidParameter, line_num)
                    .with_context(format!("unexpected character '{c}'")));
            }
            None => return Err(ParseError::new(ParseErrorKind::MissingColon, line_num)),
        }
    }
}

/// Parses one (possibly quoted) parameter value
fn parse_param_value(input: &str, line_num: usize) -> ParseResult<(String, &str)> {
    if let Some(quoted) = input.strip_prefix('"') {
        let close = quoted
            .find('"')
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnclosedQuote, line_num))?;
        Ok((decode_caret(&quoted[..close]), &quoted[close + 1..]))
    } else {
        let end = input.find([',', ';', ':']).unwrap_or(input.len());
        Ok((decode_caret(&input[..end]), &input[end..]))
    }
}

/// Resolves `^^`, `^n` and `^'` in parameter values
fn decode_caret(value: &str) -> String {
    if !value.contains('^') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('^') => {
                out.push('^');
                chars.next();
            }
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('\'') => {
                out.push('"');
                chars.next();
            }
            _ => out.push('^'),
        }
    }
    out
}

fn into_property(content: ContentLine) -> Property {
    let value = match value_kind(&content.name) {
        ValueKind::Text => Value::Text(unescape_text(&content.raw_value)),
        ValueKind::TextList => Value::TextList(
            split_text_list(&content.raw_value)
                .iter()
                .map(|item| unescape_text(item))
                .collect(),
        ),
        ValueKind::Raw => Value::Raw(content.raw_value),
    };
    Property {
        name: content.name,
        params: content.params,
        value,
    }
}

/// Resolves TEXT backslash escapes. Unknown escapes are kept as written
pub(crate) fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('n') | Some('N') => {
                out.push('\n');
                chars.next();
            }
            Some(escaped @ ('\\' | ',' | ';')) => {
                out.push(escaped);
                chars.next();
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// Splits a TEXT list on commas that are not backslash-escaped
fn split_text_list(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}
