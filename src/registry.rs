// Field registry: the catalog of bindable student attributes

use crate::error::{DesignerError, Result};
use crate::student::Student;
use crate::template::{Field, Template, DEFAULT_FIELD_SPACING_MM, DEFAULT_FIELD_X_MM, DEFAULT_FIELD_Y_MM};
use chrono::NaiveDate;

pub const MISSING_VALUE: &str = "N/A";

/// Composite key rendered as `<class>-<section>`
pub const CLASS_SECTION_KEY: &str = "classSection";

/// Keys whose values are ISO dates, shown day first
const DATE_KEYS: [&str; 2] = ["dob", "admissionDate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
}

const fn entry(key: &'static str, label: &'static str) -> FieldDescriptor {
    FieldDescriptor { key, label }
}

pub const CATALOG: &[FieldDescriptor] = &[
    entry("name", "Student Name"),
    entry("grNumber", "GR No"),
    entry("rollNo", "Roll No"),
    entry("admissionNo", "Admission No"),
    entry(CLASS_SECTION_KEY, "Class"),
    entry("class", "Class"),
    entry("section", "Section"),
    entry("fatherName", "Father"),
    entry("motherName", "Mother"),
    entry("guardianName", "Guardian"),
    entry("fatherMobile", "Father Mobile"),
    entry("motherMobile", "Mother Mobile"),
    entry("address", "Address"),
    entry("dob", "DOB"),
    entry("admissionDate", "Admitted"),
    entry("bloodGroup", "Blood Group"),
    entry("category", "Category"),
    entry("gender", "Gender"),
    entry("house", "House"),
    entry("transport", "Transport"),
];

pub fn describe(key: &str) -> Option<&'static FieldDescriptor> {
    CATALOG.iter().find(|d| d.key == key)
}

/// Display string for `key` on `student`, or `N/A` when the attribute is
/// unknown, absent or blank.
pub fn resolve_display_value(key: &str, student: &Student) -> String {
    let value = if key == CLASS_SECTION_KEY {
        class_section(student)
    } else {
        present(student.attribute(key)).map(|v| {
            if DATE_KEYS.contains(&key) {
                format_date(v)
            } else {
                v.to_string()
            }
        })
    };
    value.unwrap_or_else(|| MISSING_VALUE.to_string())
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn class_section(student: &Student) -> Option<String> {
    match (present(student.attribute("class")), present(student.attribute("section"))) {
        (Some(class), Some(section)) => Some(format!("{}-{}", class, section)),
        (Some(class), None) => Some(class.to_string()),
        (None, Some(section)) => Some(section.to_string()),
        (None, None) => None,
    }
}

fn format_date(value: &str) -> String {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.format("%d-%m-%Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Appends a field bound to `key` with the registry defaults. The new field
/// sits one line below the last field, kept on the card. Only catalog keys
/// can be added.
pub fn add_field(template: &Template, key: &str) -> Result<Template> {
    if template.has_field(key) {
        return Err(DesignerError::DuplicateField(key.to_string()));
    }
    let descriptor = describe(key).ok_or_else(|| DesignerError::UnknownField(key.to_string()))?;

    let label = descriptor.label;
    let y = template
        .fields
        .last()
        .map(|f| f.y + DEFAULT_FIELD_SPACING_MM)
        .unwrap_or(DEFAULT_FIELD_Y_MM)
        .min(template.height - DEFAULT_FIELD_SPACING_MM);

    let mut next = template.clone();
    next.fields.push(Field::new(key, label, DEFAULT_FIELD_X_MM, y));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Align, DEFAULT_FIELD_FONT_SIZE};

    fn student() -> Student {
        Student {
            name: Some("Kabir Rao".to_string()),
            class: Some("10".to_string()),
            section: Some("A".to_string()),
            roll_no: Some("  ".to_string()),
            father_mobile: Some(String::new()),
            dob: Some("2010-01-31".to_string()),
            admission_date: Some("31/01/2016".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_plain_attributes() {
        assert_eq!(resolve_display_value("name", &student()), "Kabir Rao");
    }

    #[test]
    fn class_section_is_composite() {
        assert_eq!(resolve_display_value(CLASS_SECTION_KEY, &student()), "10-A");
        let no_section = Student {
            class: Some("9".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_display_value(CLASS_SECTION_KEY, &no_section), "9");
        assert_eq!(resolve_display_value(CLASS_SECTION_KEY, &Student::default()), MISSING_VALUE);
    }

    #[test]
    fn missing_empty_and_unknown_are_na() {
        let s = student();
        assert_eq!(resolve_display_value("grNumber", &s), MISSING_VALUE);
        assert_eq!(resolve_display_value("fatherMobile", &s), MISSING_VALUE);
        assert_eq!(resolve_display_value("rollNo", &s), MISSING_VALUE);
        assert_eq!(resolve_display_value("favouriteColour", &s), MISSING_VALUE);
    }

    #[test]
    fn iso_dates_are_shown_day_first() {
        let s = student();
        assert_eq!(resolve_display_value("dob", &s), "31-01-2010");
        // anything else passes through
        assert_eq!(resolve_display_value("admissionDate", &s), "31/01/2016");
    }

    #[test]
    fn add_field_uses_defaults() {
        let template = Template::standard();
        let next = add_field(&template, "fatherMobile").unwrap();
        let field = next.field("fatherMobile").unwrap();
        assert!(field.visible);
        assert_eq!(field.font_size, DEFAULT_FIELD_FONT_SIZE);
        assert_eq!(field.align, Align::Left);
        assert!(!field.bold);
        assert_eq!(field.label, "Father Mobile");
        assert_eq!(next.fields.len(), template.fields.len() + 1);
        assert_eq!(next.fields.last().unwrap().key, "fatherMobile");
    }

    #[test]
    fn add_field_rejects_duplicates() {
        let template = Template::standard();
        let err = add_field(&template, "rollNo").unwrap_err();
        assert!(matches!(err, DesignerError::DuplicateField(ref k) if k == "rollNo"));
    }

    #[test]
    fn add_field_rejects_keys_outside_the_catalog() {
        let template = Template::standard();
        let err = add_field(&template, "favouriteColour").unwrap_err();
        assert!(matches!(err, DesignerError::UnknownField(ref k) if k == "favouriteColour"));
    }

    #[test]
    fn add_field_stays_on_the_card() {
        let mut template = Template::standard();
        for descriptor in CATALOG {
            if let Ok(next) = add_field(&template, descriptor.key) {
                template = next;
            }
        }
        assert!(template.fields.iter().all(|f| f.y < template.height));
        assert_eq!(template.fields.len(), CATALOG.len());
    }

    #[test]
    fn catalog_keys_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.key != a.key), "{}", a.key);
        }
    }
}
