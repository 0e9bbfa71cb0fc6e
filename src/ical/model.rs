/// Component name of a scheduled event
pub const VEVENT: &str = "VEVENT";

/// Properties whose values are TEXT and therefore backslash-escaped on the wire
const TEXT_PROPERTIES: &[&str] = &[
    "SUMMARY",
    "DESCRIPTION",
    "LOCATION",
    "COMMENT",
    "CONTACT",
    "UID",
    "RELATED-TO",
    "TZNAME",
    "PRODID",
];

/// Properties whose values are comma-separated TEXT lists
const TEXT_LIST_PROPERTIES: &[&str] = &["CATEGORIES", "RESOURCES"];

/// A property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unescaped TEXT
    Text(String),
    /// Unescaped TEXT list
    TextList(Vec<String>),
    /// Any other value type, kept verbatim
    Raw(String),
}

impl Value {
    /// Returns the value as a single string, joining lists with `,`
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) | Self::Raw(s) => s.clone(),
            Self::TextList(items) => items.join(","),
        }
    }
}

/// A property parameter such as `TZID=Europe/Zurich` or `ROLE=REQ-PARTICIPANT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// First value of the parameter
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A named property with optional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: Value,
}

impl Property {
    /// Creates a property whose value type is chosen from its name
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_uppercase();
        let value = value.into();
        let value = match value_kind(&name) {
            ValueKind::Text => Value::Text(value),
            ValueKind::TextList => Value::TextList(vec![value]),
            ValueKind::Raw => Value::Raw(value),
        };
        Self {
            name,
            params: Vec::new(),
            value,
        }
    }

    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Looks up a parameter by name (case-insensitive)
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn text(&self) -> String {
        self.value.as_text()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Text,
    TextList,
    Raw,
}

/// Decides how a property value is escaped, by property name
pub(crate) fn value_kind(name: &str) -> ValueKind {
    if TEXT_PROPERTIES.iter().any(|p| p.eq_ignore_ascii_case(name)) {
        ValueKind::Text
    } else if TEXT_LIST_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
    {
        ValueKind::TextList
    } else {
        ValueKind::Raw
    }
}

/// A calendar component (`VEVENT`, `VTIMEZONE`, `VALARM`, ...)
///
/// Identity is positional: components carry no generated id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Upper-cased component name
    pub name: String,
    /// Properties in source order
    pub properties: Vec<Property>,
    /// Nested sub-components in source order
    pub children: Vec<Component>,
}

impl Component {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns true if this component's kind matches `kind` (case-insensitive)
    pub fn is_kind(&self, kind: &str) -> bool {
        self.name.eq_ignore_ascii_case(kind)
    }

    pub fn is_event(&self) -> bool {
        self.is_kind(VEVENT)
    }

    /// First property with the given name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// All properties with the given name, in source order
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn push(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Removes every property with the given name; returns how many were removed
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.properties.len();
        self.properties.retain(|p| !p.name.eq_ignore_ascii_case(name));
        before - self.properties.len()
    }

    /// Removes every instance of the property's name, then inserts it
    ///
    /// The new property takes the position of the first removed instance, or
    /// is appended when there was none
    pub fn replace(&mut self, property: Property) {
        let position = self
            .properties
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(&property.name));
        self.remove_all(&property.name);
        match position {
            Some(index) => self.properties.insert(index, property),
            None => self.properties.push(property),
        }
    }

    /// A short label for logs: the UID and SUMMARY, when present
    pub fn label(&self) -> (String, String) {
        let uid = self.property("UID").map(Property::text).unwrap_or_default();
        let summary = self
            .property("SUMMARY")
            .map(Property::text)
            .unwrap_or_default();
        (uid, summary)
    }
}

/// A parsed `VCALENDAR` document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalendarDocument {
    /// Calendar-level properties (`PRODID`, `VERSION`, `METHOD`, ...)
    pub properties: Vec<Property>,
    /// Top-level components in source order
    pub components: Vec<Component>,
}

impl CalendarDocument {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn product_id(&self) -> Option<String> {
        self.property("PRODID").map(Property::text)
    }

    pub fn method(&self) -> Option<String> {
        self.property("METHOD").map(Property::text)
    }

    pub fn version(&self) -> Option<String> {
        self.property("VERSION").map(Property::text)
    }

    /// Event components, in document order
    pub fn events(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_event())
    }

    /// Render the whole document back to folded, CRLF-terminated text
    pub fn render(&self) -> crate::error::RelayResult<String> {
        super::serializer::render_document(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_attendees(count: usize) -> Component {
        let mut event = Component::new("vevent");
        event.push(Property::new("UID", "abc"));
        for i in 0..count {
            event.push(Property::new("ATTENDEE", format!("mailto:user{i}@example.com")));
        }
        event.push(Property::new("SUMMARY", "Standup"));
        event
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let event = event_with_attendees(0);
        assert!(event.is_event());
        assert_eq!(event.property("summary").map(Property::text).as_deref(), Some("Standup"));
        assert_eq!(event.property("Uid").map(Property::text).as_deref(), Some("abc"));
    }

    #[test]
    fn replace_removes_every_prior_instance() {
        let mut event = event_with_attendees(0);
        event.push(Property::new("CLASS", "PUBLIC"));
        event.push(Property::new("class", "CONFIDENTIAL"));

        event.replace(Property::new("CLASS", "PRIVATE"));

        let classes: Vec<_> = event.properties_named("CLASS").collect();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].text(), "PRIVATE");
        // took the slot of the first CLASS
        assert_eq!(event.properties[2].name, "CLASS");
    }

    #[test]
    fn replace_appends_absent_property() {
        let mut event = event_with_attendees(0);
        event.replace(Property::new("STATUS", "CONFIRMED"));
        assert_eq!(event.properties.last().map(|p| p.name.as_str()), Some("STATUS"));
    }

    #[test]
    fn remove_all_counts_removed() {
        let mut event = event_with_attendees(3);
        assert_eq!(event.remove_all("attendee"), 3);
        assert_eq!(event.remove_all("ATTENDEE"), 0);
        assert_eq!(event.properties.len(), 2);
    }

    #[test]
    fn value_kind_follows_property_name() {
        assert_eq!(Property::new("summary", "x").value, Value::Text("x".into()));
        assert_eq!(
            Property::new("CATEGORIES", "x").value,
            Value::TextList(vec!["x".into()])
        );
        assert_eq!(Property::new("DTSTART", "x").value, Value::Raw("x".into()));
    }
}
