use crate::ical::{Component, Property};

/// Turn a feed event into a private, confirmed meeting request.
///
/// Works on a copy; the parsed document is never touched. CLASS, METHOD and
/// STATUS end up with exactly one instance each and every ATTENDEE is
/// dropped. Sub-components (alarms) pass through unchanged.
pub fn sanitize(event: &Component) -> Component {
    let mut sanitized = event.clone();
    sanitized.replace(Property::new("CLASS", "PRIVATE"));
    sanitized.replace(Property::new("METHOD", "REQUEST"));
    sanitized.replace(Property::new("STATUS", "CONFIRMED"));
    sanitized.remove_all("ATTENDEE");
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::{Parameter, Value};

    fn event(attendees: usize) -> Component {
        let mut event = Component::new("VEVENT");
        event.push(Property::new("UID", "1@example.com"));
        event.push(Property::new("SUMMARY", "Rehearsal"));
        event.push(Property::new("CLASS", "PUBLIC"));
        event.push(Property::new("STATUS", "TENTATIVE"));
        for i in 0..attendees {
            event.push(
                Property::new("ATTENDEE", format!("mailto:p{i}@example.com"))
                    .with_param(Parameter::new("ROLE", "REQ-PARTICIPANT")),
            );
        }
        event
    }

    fn single(component: &Component, name: &str) -> String {
        let found: Vec<_> = component.properties_named(name).collect();
        assert_eq!(found.len(), 1, "{name} should appear once");
        found[0].text()
    }

    #[test]
    fn rewrites_privacy_method_and_status() {
        let sanitized = sanitize(&event(1));
        assert_eq!(single(&sanitized, "CLASS"), "PRIVATE");
        assert_eq!(single(&sanitized, "METHOD"), "REQUEST");
        assert_eq!(single(&sanitized, "STATUS"), "CONFIRMED");
    }

    #[test]
    fn removes_every_attendee() {
        for count in [0, 1, 5] {
            let sanitized = sanitize(&event(count));
            assert_eq!(sanitized.properties_named("ATTENDEE").count(), 0);
        }
    }

    #[test]
    fn is_idempotent() {
        let once = sanitize(&event(3));
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn leaves_source_and_untouched_properties_alone() {
        let source = event(2);
        let sanitized = sanitize(&source);

        assert_eq!(source.properties_named("ATTENDEE").count(), 2);
        assert_eq!(single(&source, "CLASS"), "PUBLIC");
        assert_eq!(sanitized.properties[0], source.properties[0]);
        assert_eq!(sanitized.properties[1], source.properties[1]);
        assert_eq!(
            sanitized.property("SUMMARY").map(|p| p.value.clone()),
            Some(Value::Text("Rehearsal".into()))
        );
    }

    #[test]
    fn adds_absent_properties() {
        let mut bare = Component::new("VEVENT");
        bare.push(Property::new("UID", "bare"));
        let sanitized = sanitize(&bare);
        assert_eq!(sanitized.properties.len(), 4);
        assert_eq!(single(&sanitized, "METHOD"), "REQUEST");
    }

    #[test]
    fn keeps_alarms() {
        let mut alarm = Component::new("VALARM");
        alarm.push(Property::new("ACTION", "DISPLAY"));
        alarm.push(Property::new("ATTENDEE", "mailto:alarm@example.com"));
        let mut with_alarm = event(1);
        with_alarm.children.push(alarm.clone());

        let sanitized = sanitize(&with_alarm);
        assert_eq!(sanitized.children, vec![alarm]);
    }
}
