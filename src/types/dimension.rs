use serde::{Deserialize, Serialize};

/// Whether a dimension's admissible values are seeded by administrators or
/// created on demand by publishers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// Values are seeded at install time and shared by many courses.
    /// Never created by publishers, never deleted individually.
    FixedOption,
    /// Values are created per submission and garbage-collected once no
    /// course references them anymore.
    FreeForm,
}

/// The closed set of tag dimensions a published course can carry.
///
/// Each dimension stores its values in `tag_options` and its course links in
/// `tag_assignments`, so fixed and free-form dimensions share one storage
/// model and differ only in who owns the option rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Subject,
    SchoolType,
    SchoolYear,
    CompUse,
    Oer,
    Tags,
    Description,
    CourseName,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Subject,
        Dimension::SchoolType,
        Dimension::SchoolYear,
        Dimension::CompUse,
        Dimension::Oer,
        Dimension::Tags,
        Dimension::Description,
        Dimension::CourseName,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Subject => "subject",
            Dimension::SchoolType => "schooltype",
            Dimension::SchoolYear => "schoolyear",
            Dimension::CompUse => "compuse",
            Dimension::Oer => "oer",
            Dimension::Tags => "tags",
            Dimension::Description => "description",
            Dimension::CourseName => "coursename",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    #[must_use]
    pub fn kind(self) -> DimensionKind {
        match self {
            Dimension::Subject
            | Dimension::SchoolType
            | Dimension::SchoolYear
            | Dimension::CompUse
            | Dimension::Oer => DimensionKind::FixedOption,
            Dimension::Tags | Dimension::Description | Dimension::CourseName => {
                DimensionKind::FreeForm
            }
        }
    }

    /// Free-form dimensions that accept a comma-separated list of values.
    /// Single-valued free-form dimensions (description, coursename) keep
    /// their commas.
    #[must_use]
    pub fn multi_valued(self) -> bool {
        matches!(
            self,
            Dimension::Subject
                | Dimension::SchoolType
                | Dimension::SchoolYear
                | Dimension::CompUse
                | Dimension::Tags
        )
    }

    /// Default option values inserted at install/upgrade time.
    /// Empty for free-form dimensions.
    #[must_use]
    pub fn seed_values(self) -> &'static [&'static str] {
        match self {
            Dimension::Subject => SUBJECTS,
            Dimension::SchoolType => SCHOOL_TYPES,
            Dimension::SchoolYear => SCHOOL_YEARS,
            Dimension::CompUse => COMP_USES,
            Dimension::Oer => &["OER"],
            Dimension::Tags | Dimension::Description | Dimension::CourseName => &[],
        }
    }
}

/// School subjects offered as fixed options in the publication form.
const SUBJECTS: &[&str] = &[
    "Biologie",
    "Chemie",
    "Chinesisch",
    "Deutsch",
    "Deutsch als Zweitsprache",
    "Elektrotechnik",
    "Englisch",
    "Ethik",
    "Evangelische Religionslehre",
    "Französisch",
    "Geographie",
    "Geschichte",
    "Griechisch",
    "Hauswirtschaft",
    "Informatik",
    "Informationstechnologie",
    "Italienisch",
    "Japanisch",
    "Katholische Religionslehre",
    "Kunst",
    "Latein",
    "Mathematik",
    "Mechatronik",
    "Medien",
    "Musik",
    "Natur und Technik",
    "Naturwissenschaften",
    "Pädagogik",
    "Physik",
    "Politik und Gesellschaft",
    "Psychologie",
    "Rechnungswesen",
    "Russisch",
    "Sozialkunde",
    "Spanisch",
    "Sport",
    "Technik",
    "Tschechisch",
    "Türkisch",
    "Volkswirtschaftslehre",
    "Werken und Gestalten",
    "Wirtschaft und Recht",
    "Wirtschaftsinformatik",
];

const SCHOOL_TYPES: &[&str] = &[
    "Grundschule",
    "Mittelschule",
    "Realschule",
    "Wirtschaftsschule",
    "Gymnasium",
    "Förderschule",
    "Berufschule",
    "Fachoberschule",
    "Berufsoberschule",
    "Fachschule",
    "Fachakademie",
];

const SCHOOL_YEARS: &[&str] = &[
    "Jgst 1", "Jgst 2", "Jgst 3", "Jgst 4", "Jgst 5", "Jgst 6", "Jgst 7", "Jgst 8", "Jgst 9",
    "Jgst 10", "Jgst 11", "Jgst 12", "Jgst 13",
];

const COMP_USES: &[&str] = &["zu Hause", "im Unterricht"];
