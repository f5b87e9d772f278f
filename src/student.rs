// Student: roster records and roster loading

use crate::error::{DesignerError, Result};
use serde::{Deserialize, Serialize};

/// Student record supplied by the roster. Read-only during rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub id: Option<String>,
    pub name: Option<String>,
    pub gr_number: Option<String>,
    pub roll_no: Option<String>,
    pub admission_no: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub guardian_name: Option<String>,
    pub father_mobile: Option<String>,
    pub mother_mobile: Option<String>,
    pub address: Option<String>,
    pub dob: Option<String>,
    pub admission_date: Option<String>,
    pub blood_group: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub house: Option<String>,
    pub transport: Option<String>,
    /// Encoded photo (a `data:` URL)
    pub photo: Option<String>,
}

impl Student {
    /// Raw attribute for a registry key. Composite keys are resolved by the
    /// registry, not here.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        let value = match key {
            "name" => &self.name,
            "grNumber" => &self.gr_number,
            "rollNo" => &self.roll_no,
            "admissionNo" => &self.admission_no,
            "class" => &self.class,
            "section" => &self.section,
            "fatherName" => &self.father_name,
            "motherName" => &self.mother_name,
            "guardianName" => &self.guardian_name,
            "fatherMobile" => &self.father_mobile,
            "motherMobile" => &self.mother_mobile,
            "address" => &self.address,
            "dob" => &self.dob,
            "admissionDate" => &self.admission_date,
            "bloodGroup" => &self.blood_group,
            "category" => &self.category,
            "gender" => &self.gender,
            "house" => &self.house,
            "transport" => &self.transport,
            _ => return None,
        };
        value.as_deref()
    }

    /// Stand-in record for previewing a template when no roster is known.
    pub fn sample() -> Self {
        Student {
            id: Some("sample".to_string()),
            name: Some("Aarav Sharma".to_string()),
            gr_number: Some("GR-1024".to_string()),
            roll_no: Some("17".to_string()),
            class: Some("8".to_string()),
            section: Some("B".to_string()),
            father_name: Some("Rajesh Sharma".to_string()),
            father_mobile: Some("9876543210".to_string()),
            address: Some("12 Park Street".to_string()),
            dob: Some("2012-04-09".to_string()),
            blood_group: Some("B+".to_string()),
            ..Default::default()
        }
    }
}

pub fn load_roster(path: &str) -> Result<Vec<Student>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DesignerError::Roster(format!("{}: {}", path, e)))?;
    serde_json::from_str(&content)
        .map_err(|e| DesignerError::Roster(format!("Invalid JSON: {}", e)))
}

/// The record used for live preview: the first known student, or the
/// built-in sample when the roster is empty.
pub fn sample_student(roster: &[Student]) -> Student {
    roster.first().cloned().unwrap_or_else(Student::sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_records() {
        let students: Vec<Student> =
            serde_json::from_str(r#"[{"name": "Meera", "rollNo": "4", "fatherMobile": "555"}]"#).unwrap();
        assert_eq!(students[0].attribute("name"), Some("Meera"));
        assert_eq!(students[0].attribute("rollNo"), Some("4"));
        assert_eq!(students[0].attribute("fatherMobile"), Some("555"));
        assert_eq!(students[0].attribute("dob"), None);
    }

    #[test]
    fn unknown_attribute_is_none() {
        assert_eq!(Student::sample().attribute("shoeSize"), None);
    }

    #[test]
    fn preview_uses_first_record_or_sample() {
        let first = Student {
            name: Some("First".to_string()),
            ..Default::default()
        };
        let roster = vec![first.clone(), Student::default()];
        assert_eq!(sample_student(&roster), first);
        assert_eq!(sample_student(&[]), Student::sample());
    }

    #[test]
    fn missing_roster_file_is_an_error() {
        assert!(matches!(
            load_roster("does/not/exist.json"),
            Err(DesignerError::Roster(_))
        ));
    }
}
