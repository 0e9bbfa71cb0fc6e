use super::model::{CalendarDocument, Component, Parameter, Property, Value};
use crate::error::{serialization_error, RelayResult};

/// Product identifier written into every outbound envelope
pub const PRODUCT_ID: &str = "-//Inboxics//Feed Relay//EN";

/// Line terminator required by the calendar format
pub const CRLF: &str = "\r\n";

/// Maximum line length in octets before folding
const MAX_LINE_OCTETS: usize = 75;

/// Renders one component, its properties and its sub-components
///
/// Fails with [`crate::error::Error::Serialization`] when a value contains a
/// control character that has no escaped form
pub fn render_component(component: &Component) -> RelayResult<String> {
    let mut out = String::new();
    write_component(&mut out, component)?;
    Ok(out)
}

/// Renders a whole document, calendar-level properties first
pub fn render_document(document: &CalendarDocument) -> RelayResult<String> {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    for property in &document.properties {
        push_line(&mut out, &fold_line(&render_property(property)?));
    }
    for component in &document.components {
        write_component(&mut out, component)?;
    }
    push_line(&mut out, "END:VCALENDAR");
    Ok(out)
}

/// Wraps one rendered event in a complete `VCALENDAR` envelope
///
/// The envelope carries a fixed header (`PRODID`, `METHOD:REQUEST`,
/// `VERSION:2.0`) and always holds exactly one `VEVENT`. Fails when the text
/// is not a single balanced `VEVENT`, already carries its own `VCALENDAR`
/// lines or contains control characters
pub fn wrap_single_event(event_text: &str) -> RelayResult<String> {
    let trimmed = event_text.trim();
    let lines: Vec<&str> = trimmed
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if let Some(c) = trimmed
        .chars()
        .find(|c| c.is_control() && !matches!(c, '\r' | '\n' | '\t'))
    {
        return Err(serialization_error(&format!(
            "event text contains control character U+{:04X}",
            u32::from(c)
        )));
    }

    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return Err(serialization_error("event text is empty"));
    };
    if !first.eq_ignore_ascii_case("BEGIN:VEVENT") || !last.eq_ignore_ascii_case("END:VEVENT") {
        return Err(serialization_error(
            "event text must start with BEGIN:VEVENT and end with END:VEVENT",
        ));
    }

    let mut open: Vec<&str> = Vec::new();
    let mut events = 0usize;
    for line in &lines {
        if line.eq_ignore_ascii_case("BEGIN:VCALENDAR") || line.eq_ignore_ascii_case("END:VCALENDAR") {
            return Err(serialization_error("event text already contains a VCALENDAR envelope"));
        }
        if starts_with_ignore_case(line, "BEGIN:") {
            let name = &line["BEGIN:".len()..];
            if open.is_empty() && name.eq_ignore_ascii_case("VEVENT") {
                events += 1;
            }
            open.push(name);
        } else if starts_with_ignore_case(line, "END:") {
            let name = &line["END:".len()..];
            match open.pop() {
                Some(expected) if expected.eq_ignore_ascii_case(name) => {}
                Some(expected) => {
                    return Err(serialization_error(&format!(
                        "expected END:{expected}, got {line}"
                    )));
                }
                None => {
                    return Err(serialization_error(&format!("unmatched {line}")));
                }
            }
        }
    }
    if let Some(name) = open.last() {
        return Err(serialization_error(&format!("BEGIN:{name} is never closed")));
    }
    if events != 1 {
        return Err(serialization_error(&format!(
            "envelope must hold exactly one event, found {events}"
        )));
    }

    let mut out = String::with_capacity(trimmed.len() + 96);
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, &format!("PRODID:{PRODUCT_ID}"));
    push_line(&mut out, "METHOD:REQUEST");
    push_line(&mut out, "VERSION:2.0");
    for line in lines {
        push_line(&mut out, line);
    }
    push_line(&mut out, "END:VCALENDAR");
    Ok(out)
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(CRLF);
}

fn write_component(out: &mut String, component: &Component) -> RelayResult<()> {
    push_line(out, &format!("BEGIN:{}", component.name));
    for property in &component.properties {
        push_line(out, &fold_line(&render_property(property)?));
    }
    for child in &component.children {
        write_component(out, child)?;
    }
    push_line(out, &format!("END:{}", component.name));
    Ok(())
}

/// Renders one unfolded content line
pub fn render_property(property: &Property) -> RelayResult<String> {
    let mut line = property.name.clone();
    for param in &property.params {
        line.push(';');
        line.push_str(&render_parameter(param)?);
    }
    line.push(':');

    let value = match &property.value {
        Value::Text(text) => escape_text(text),
        Value::TextList(items) => items
            .iter()
            .map(|item| escape_text(item))
            .collect::<Result<Vec<_>, _>>()
            .map(|items| items.join(",")),
        Value::Raw(raw) => check_raw(raw).map(|()| raw.clone()),
    }
    .map_err(|reason| serialization_error(&format!("property {}: {}", property.name, reason)))?;

    line.push_str(&value);
    Ok(line)
}

fn render_parameter(param: &Parameter) -> RelayResult<String> {
    let values = param
        .values
        .iter()
        .map(|value| {
            if value.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
                return Err(serialization_error(&format!(
                    "parameter {} contains a control character",
                    param.name
                )));
            }
            let encoded = encode_caret(value);
            if encoded.contains([':', ';', ',']) {
                Ok(format!("\"{encoded}\""))
            } else {
                Ok(encoded)
            }
        })
        .collect::<RelayResult<Vec<_>>>()?;
    Ok(format!("{}={}", param.name, values.join(",")))
}

fn encode_caret(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '^' => out.push_str("^^"),
            '\n' => out.push_str("^n"),
            '"' => out.push_str("^'"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a TEXT value: backslash, semicolon, comma and newlines
fn escape_text(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("\\n");
            }
            '\t' => out.push(c),
            c if c.is_control() => {
                return Err(format!("unescapable control character U+{:04X}", u32::from(c)));
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn check_raw(raw: &str) -> Result<(), String> {
    match raw.chars().find(|c| c.is_control() && *c != '\t') {
        Some(c) => Err(format!("unescaped control character U+{:04X}", u32::from(c))),
        None => Ok(()),
    }
}

/// Folds a content line at 75 octets, never splitting a UTF-8 sequence
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut current_len = 0;

    for c in line.chars() {
        let char_len = c.len_utf8();
        if current_len + char_len > MAX_LINE_OCTETS {
            result.push_str("\r\n ");
            // the leading space counts towards the next line
            current_len = 1;
        }
        result.push(c);
        current_len += char_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ical::parse;

    fn event() -> Component {
        let mut event = Component::new("VEVENT");
        event.push(Property::new("UID", "42@example.com"));
        event.push(Property::new("SUMMARY", "Lunch; bring snacks, please"));
        event.push(Property::new("DTSTART", "20240101T120000Z"));
        event
    }

    #[test]
    fn renders_component_with_crlf_and_escapes() {
        let text = render_component(&event()).unwrap();
        assert_eq!(
            text,
            "BEGIN:VEVENT\r\nUID:42@example.com\r\nSUMMARY:Lunch\\; bring snacks\\, please\r\nDTSTART:20240101T120000Z\r\nEND:VEVENT\r\n"
        );
    }

    #[test]
    fn quotes_parameter_values_with_separators() {
        let property = Property::new("ATTENDEE", "mailto:a@example.com")
            .with_param(Parameter::new("CN", "Doe, Jane"))
            .with_param(Parameter::new("ROLE", "CHAIR"));
        assert_eq!(
            render_property(&property).unwrap(),
            "ATTENDEE;CN=\"Doe, Jane\";ROLE=CHAIR:mailto:a@example.com"
        );
    }

    #[test]
    fn control_characters_fail_rendering() {
        let mut bad = event();
        bad.push(Property::new("X-NOTE", "bell\u{7}"));
        assert!(matches!(render_component(&bad), Err(Error::Serialization(_))));

        let mut bad_text = event();
        bad_text.push(Property::new("DESCRIPTION", "nul\u{0}"));
        assert!(matches!(render_component(&bad_text), Err(Error::Serialization(_))));
    }

    #[test]
    fn folds_long_lines() {
        let long = format!("DESCRIPTION:{}", "x".repeat(100));
        let folded = fold_line(&long);
        let parts: Vec<_> = folded.split("\r\n").collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 75);
        assert!(parts[1].starts_with(' '));
        assert_eq!(fold_line("SUMMARY:short"), "SUMMARY:short");
    }

    #[test]
    fn folding_respects_utf8() {
        let line = format!("SUMMARY:{}", "日".repeat(40));
        for part in fold_line(&line).split("\r\n") {
            assert!(part.len() <= MAX_LINE_OCTETS);
        }
    }

    #[test]
    fn wraps_exactly_one_event() {
        let text = render_component(&event()).unwrap();
        let envelope = wrap_single_event(&text).unwrap();
        assert!(envelope.starts_with(
            "BEGIN:VCALENDAR\r\nPRODID:-//Inboxics//Feed Relay//EN\r\nMETHOD:REQUEST\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\n"
        ));
        assert!(envelope.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
        assert_eq!(envelope.matches("BEGIN:VCALENDAR").count(), 1);
        assert_eq!(envelope.matches("END:VCALENDAR").count(), 1);
    }

    #[test]
    fn wrap_normalises_bare_lf_and_surrounding_whitespace() {
        let envelope = wrap_single_event("\n  BEGIN:VEVENT\nUID:1\nEND:VEVENT\n\n").unwrap();
        assert_eq!(
            envelope,
            format!(
                "BEGIN:VCALENDAR\r\nPRODID:{PRODUCT_ID}\r\nMETHOD:REQUEST\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:1\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
            )
        );
    }

    #[test]
    fn wrap_keeps_nested_alarm() {
        let text = "BEGIN:VEVENT\r\nUID:1\r\nBEGIN:VALARM\r\nACTION:DISPLAY\r\nEND:VALARM\r\nEND:VEVENT";
        let envelope = wrap_single_event(text).unwrap();
        assert!(envelope.contains("BEGIN:VALARM\r\nACTION:DISPLAY\r\nEND:VALARM\r\n"));
        assert!(parse(&envelope).is_ok());
    }

    #[test]
    fn wrap_rejects_non_single_event_text() {
        assert!(wrap_single_event("").is_err());
        assert!(wrap_single_event("BEGIN:VTODO\r\nEND:VTODO").is_err());
        assert!(wrap_single_event(
            "BEGIN:VEVENT\r\nUID:1\r\nEND:VEVENT\r\nBEGIN:VEVENT\r\nUID:2\r\nEND:VEVENT"
        )
        .is_err());
        assert!(wrap_single_event(
            "BEGIN:VEVENT\r\nBEGIN:VCALENDAR\r\nEND:VCALENDAR\r\nEND:VEVENT"
        )
        .is_err());
        assert!(wrap_single_event("BEGIN:VEVENT\r\nSUMMARY:a\u{1b}b\r\nEND:VEVENT").is_err());
        // stray END after the event closed
        assert!(
            wrap_single_event("BEGIN:VEVENT\r\nUID:1\r\nEND:VEVENT\r\nX-A:1\r\nEND:VEVENT")
                .is_err()
        );
        // alarm left open
        assert!(wrap_single_event("BEGIN:VEVENT\r\nBEGIN:VALARM\r\nEND:VEVENT").is_err());
    }

    #[test]
    fn document_round_trips_through_render() {
        let source = "BEGIN:VCALENDAR\r\nPRODID:-//Example//EN\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:a\r\nSUMMARY:x\\, y\\; z\\nw\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let doc = parse(source).unwrap();
        assert_eq!(render_document(&doc).unwrap(), source);
        assert_eq!(doc.render().unwrap(), source);
    }
}
