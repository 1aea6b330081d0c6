//! Form definitions shared by the attendance and membership reports
//!
//! Both reports are described by a [`FormSpec`]: the fields collected, the
//! rules that gate submission, and the worksheet column order. One generic
//! collect/validate/submit pipeline consumes either spec.

use chrono::Month;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod name;
pub mod state;

pub use state::{FieldInput, FieldValue, Form, FormState, Session, Step};

/// Field identifiers, also used as keys in value files
pub mod fields {
    pub const REGION: &str = "region";
    pub const CAMPUS: &str = "campus";
    pub const PERIOD: &str = "period";
    pub const NAME: &str = "name";
    pub const BAPTIZED: &str = "baptized";
    pub const BROTHERS: &str = "brothers";
    pub const SISTERS: &str = "sisters";
    pub const BOYS: &str = "boys";
    pub const GIRLS: &str = "girls";
    pub const VISITORS_MALE: &str = "visitors_male";
    pub const VISITORS_FEMALE: &str = "visitors_female";
    pub const HIGH_BROTHERS: &str = "high_brothers";
    pub const HIGH_SISTERS: &str = "high_sisters";
    pub const HIGH_BOYS: &str = "high_boys";
    pub const HIGH_GIRLS: &str = "high_girls";
    pub const LOW_BROTHERS: &str = "low_brothers";
    pub const LOW_SISTERS: &str = "low_sisters";
    pub const LOW_BOYS: &str = "low_boys";
    pub const LOW_GIRLS: &str = "low_girls";
    pub const OFFERING: &str = "offering";
    pub const WORKERS_MALE: &str = "workers_male";
    pub const WORKERS_FEMALE: &str = "workers_female";

    /// Fields summed into the overall month total
    pub const OVERALL: [&str; 4] = [BROTHERS, SISTERS, BOYS, GIRLS];
    /// Fields summed into the high-week total
    pub const HIGH_WEEK: [&str; 4] = [HIGH_BROTHERS, HIGH_SISTERS, HIGH_BOYS, HIGH_GIRLS];
    /// Fields summed into the low-week total
    pub const LOW_WEEK: [&str; 4] = [LOW_BROTHERS, LOW_SISTERS, LOW_BOYS, LOW_GIRLS];
}

/// The two report forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Membership,
    Attendance,
}

impl FormKind {
    /// Chooser order
    pub const ALL: [FormKind; 2] = [FormKind::Membership, FormKind::Attendance];

    /// Key used in configuration and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            FormKind::Membership => "membership",
            FormKind::Attendance => "attendance",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FormKind::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Label shown in the form chooser
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Membership => "Membership Attendance",
            FormKind::Attendance => "Monthly Attendance",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// What kind of input a field takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Select over the reference regions
    Region,
    /// Select over the campuses of the chosen region
    Campus,
    /// Select over the reporting periods
    Period,
    /// Free-text submitter name
    Name,
    /// Non-negative headcount
    Count,
    /// Non-negative monetary amount
    Amount,
}

impl FieldKind {
    pub fn is_select(&self) -> bool {
        matches!(self, FieldKind::Region | FieldKind::Campus | FieldKind::Period)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Section heading the field is shown under
    pub section: Option<&'static str>,
}

impl FieldSpec {
    fn new(id: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            id,
            label,
            kind,
            section: None,
        }
    }

    fn in_section(mut self, section: &'static str) -> Self {
        self.section = Some(section);
        self
    }
}

/// One worksheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Submission time, always the first column
    Timestamp,
    Field(&'static str),
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Field(id) => *id,
        }
    }
}

/// Full description of one report form
#[derive(Debug, Clone)]
pub struct FormSpec {
    pub kind: FormKind,
    /// Heading of the counts section
    pub summary_heading: &'static str,
    pub fields: Vec<FieldSpec>,
    pub columns: Vec<Column>,
    /// Period candidates, without the placeholder
    pub periods: Vec<String>,
    /// Rules that apply to this form, before configuration filtering
    pub rule_ids: Vec<&'static str>,
}

impl FormSpec {
    pub fn new(kind: FormKind, year: i32, weekly_breakdown: bool) -> Self {
        match kind {
            FormKind::Attendance => Self::attendance(year, weekly_breakdown),
            FormKind::Membership => Self::membership(year),
        }
    }

    /// Monthly campus attendance
    pub fn attendance(year: i32, weekly_breakdown: bool) -> Self {
        use fields::*;

        let mut field_list = vec![
            FieldSpec::new(REGION, "Region", FieldKind::Region),
            FieldSpec::new(CAMPUS, "Campus", FieldKind::Campus),
            FieldSpec::new(PERIOD, "Month", FieldKind::Period),
            FieldSpec::new(NAME, "Name", FieldKind::Name),
            FieldSpec::new(BAPTIZED, "Number Baptized", FieldKind::Count),
            FieldSpec::new(BROTHERS, "Brothers", FieldKind::Count).in_section("Month"),
            FieldSpec::new(SISTERS, "Sisters", FieldKind::Count).in_section("Month"),
            FieldSpec::new(BOYS, "Children Boys", FieldKind::Count).in_section("Month"),
            FieldSpec::new(GIRLS, "Children Girls", FieldKind::Count).in_section("Month"),
            FieldSpec::new(VISITORS_MALE, "Visitors Male", FieldKind::Count).in_section("Month"),
            FieldSpec::new(VISITORS_FEMALE, "Visitors Female", FieldKind::Count)
                .in_section("Month"),
        ];
        if weekly_breakdown {
            field_list.extend([
                FieldSpec::new(HIGH_BROTHERS, "Brothers", FieldKind::Count).in_section("High week"),
                FieldSpec::new(HIGH_SISTERS, "Sisters", FieldKind::Count).in_section("High week"),
                FieldSpec::new(HIGH_BOYS, "Children Boys", FieldKind::Count).in_section("High week"),
                FieldSpec::new(HIGH_GIRLS, "Children Girls", FieldKind::Count)
                    .in_section("High week"),
                FieldSpec::new(LOW_BROTHERS, "Brothers", FieldKind::Count).in_section("Low week"),
                FieldSpec::new(LOW_SISTERS, "Sisters", FieldKind::Count).in_section("Low week"),
                FieldSpec::new(LOW_BOYS, "Children Boys", FieldKind::Count).in_section("Low week"),
                FieldSpec::new(LOW_GIRLS, "Children Girls", FieldKind::Count).in_section("Low week"),
            ]);
        }
        field_list.push(FieldSpec::new(OFFERING, "1st Offering", FieldKind::Amount));

        let mut columns = vec![
            Column::Timestamp,
            Column::Field(REGION),
            Column::Field(CAMPUS),
            Column::Field(PERIOD),
            Column::Field(BAPTIZED),
            Column::Field(BROTHERS),
            Column::Field(SISTERS),
            Column::Field(BOYS),
            Column::Field(GIRLS),
            Column::Field(VISITORS_MALE),
            Column::Field(VISITORS_FEMALE),
        ];
        if weekly_breakdown {
            columns.extend(HIGH_WEEK.map(Column::Field));
            columns.extend(LOW_WEEK.map(Column::Field));
        }
        columns.push(Column::Field(OFFERING));
        columns.push(Column::Field(NAME));

        let mut rule_ids = vec![
            "SEL001", "SEL002", "SEL003", "REQ001", "REQ002", "REQ003", "NAME001",
        ];
        if weekly_breakdown {
            rule_ids.extend(["XF001", "XF002"]);
        }

        Self {
            kind: FormKind::Attendance,
            summary_heading: "ATTENDANCE SUMMARY",
            fields: field_list,
            columns,
            periods: month_periods(year),
            rule_ids,
        }
    }

    /// Quarterly membership counts
    pub fn membership(year: i32) -> Self {
        use fields::*;

        let field_list = vec![
            FieldSpec::new(REGION, "Region", FieldKind::Region),
            FieldSpec::new(CAMPUS, "Campus", FieldKind::Campus),
            FieldSpec::new(PERIOD, "Period", FieldKind::Period),
            FieldSpec::new(NAME, "Name", FieldKind::Name),
            FieldSpec::new(BROTHERS, "Brothers", FieldKind::Count),
            FieldSpec::new(SISTERS, "Sisters", FieldKind::Count),
            FieldSpec::new(BOYS, "Children Boys", FieldKind::Count),
            FieldSpec::new(GIRLS, "Children Girls", FieldKind::Count),
            FieldSpec::new(WORKERS_MALE, "Workers Male", FieldKind::Count),
            FieldSpec::new(WORKERS_FEMALE, "Workers Female", FieldKind::Count),
        ];

        let columns = vec![
            Column::Timestamp,
            Column::Field(REGION),
            Column::Field(CAMPUS),
            Column::Field(PERIOD),
            Column::Field(BROTHERS),
            Column::Field(SISTERS),
            Column::Field(BOYS),
            Column::Field(GIRLS),
            Column::Field(WORKERS_MALE),
            Column::Field(WORKERS_FEMALE),
            Column::Field(NAME),
        ];

        Self {
            kind: FormKind::Membership,
            summary_heading: "MEMBERSHIP SUMMARY",
            fields: field_list,
            columns,
            periods: quarter_periods(year),
            rule_ids: vec!["SEL001", "SEL002", "SEL003", "REQ001", "NAME001"],
        }
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Label of the period select ("Month" or "Period")
    pub fn period_label(&self) -> &'static str {
        self.field(fields::PERIOD).map(|f| f.label).unwrap_or("Period")
    }

    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.rule_ids.iter().any(|id| *id == rule_id)
    }

    /// Worksheet header row
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(Column::header).collect()
    }
}

/// "January 2025" .. "December 2025"
pub fn month_periods(year: i32) -> Vec<String> {
    (1..=12u8)
        .filter_map(|m| Month::try_from(m).ok())
        .map(|m| format!("{} {}", m.name(), year))
        .collect()
}

/// "Q1 2025" .. "Q4 2025"
pub fn quarter_periods(year: i32) -> Vec<String> {
    (1..=4).map(|q| format!("Q{} {}", q, year)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods() {
        let months = month_periods(2025);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], "January 2025");
        assert_eq!(months[11], "December 2025");
        assert_eq!(quarter_periods(2025), ["Q1 2025", "Q2 2025", "Q3 2025", "Q4 2025"]);
    }

    #[test]
    fn test_attendance_columns() {
        let spec = FormSpec::attendance(2025, true);
        let headers = spec.headers();
        assert_eq!(headers.len(), 21);
        assert_eq!(headers[0], "timestamp");
        assert_eq!(&headers[1..5], ["region", "campus", "period", "baptized"]);
        assert_eq!(headers[11], "high_brothers");
        assert_eq!(headers[15], "low_brothers");
        assert_eq!(&headers[19..], ["offering", "name"]);
        assert!(spec.has_rule("XF002"));
    }

    #[test]
    fn test_attendance_without_breakdown() {
        let spec = FormSpec::attendance(2025, false);
        assert_eq!(spec.columns.len(), 13);
        assert!(spec.field(fields::LOW_GIRLS).is_none());
        assert!(!spec.has_rule("XF001"));
    }

    #[test]
    fn test_membership_columns() {
        let spec = FormSpec::membership(2025);
        assert_eq!(
            spec.headers(),
            [
                "timestamp",
                "region",
                "campus",
                "period",
                "brothers",
                "sisters",
                "boys",
                "girls",
                "workers_male",
                "workers_female",
                "name"
            ]
        );
        assert_eq!(spec.period_label(), "Period");
        assert!(!spec.has_rule("REQ002"));
    }

    #[test]
    fn test_kind_keys() {
        for kind in FormKind::ALL {
            assert_eq!(FormKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(FormKind::from_key("payroll"), None);
        assert_eq!(FormKind::Attendance.title(), "Monthly Attendance");
    }
}
