//! Template variant configuration.
//!
//! One parameterized pipeline replaces the three near-duplicate per-variant
//! pipelines: each variant is a static record enumerating the fields to
//! extract, the placeholders to fill, the tables to populate, and whether
//! the photo step runs.

use serde::{Deserialize, Serialize};

use crate::docx::EmptyRowRule;
use crate::fields::FieldKind;

/// The three fixed output document layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateVariant {
    Internal,
    Client,
    ClientPhoto,
}

impl TemplateVariant {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internal" => Some(TemplateVariant::Internal),
            "client" => Some(TemplateVariant::Client),
            "client_photo" => Some(TemplateVariant::ClientPhoto),
            _ => None,
        }
    }

    pub fn config(self) -> &'static VariantConfig {
        match self {
            TemplateVariant::Internal => &INTERNAL,
            TemplateVariant::Client => &CLIENT,
            TemplateVariant::ClientPhoto => &CLIENT_PHOTO,
        }
    }
}

/// A text placeholder in the template body, filled from one field.
#[derive(Debug, Clone, Copy)]
pub struct Placeholder {
    pub token: &'static str,
    pub field: FieldKind,
}

/// Which structured records a table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Education,
    Skills,
    Experience,
}

/// A table to populate: its kind plus its index in document order.
/// Column meaning is fixed per kind (education: degree / institution /
/// years; experience: organization / role / duration; skills: one column).
#[derive(Debug, Clone, Copy)]
pub struct TableTarget {
    pub kind: TableKind,
    pub index: usize,
}

pub struct VariantConfig {
    pub key: &'static str,
    pub template_file: &'static str,
    pub output_dir: &'static str,
    pub fields: &'static [FieldKind],
    pub placeholders: &'static [Placeholder],
    pub tables: &'static [TableTarget],
    pub photo_step: bool,
    pub empty_row_rule: EmptyRowRule,
}

static INTERNAL: VariantConfig = VariantConfig {
    key: "internal",
    template_file: "internal_template.docx",
    output_dir: "resume_internal",
    fields: &[
        FieldKind::Name,
        FieldKind::Education,
        FieldKind::Summary,
        FieldKind::Certifications,
        FieldKind::TechnicalSkills,
        FieldKind::WorkExperience,
    ],
    placeholders: &[
        Placeholder {
            token: "{{NAME}}",
            field: FieldKind::Name,
        },
        Placeholder {
            token: "{{SUMMARY}}",
            field: FieldKind::Summary,
        },
        Placeholder {
            token: "{{CERTIFICATIONS}}",
            field: FieldKind::Certifications,
        },
    ],
    tables: &[
        TableTarget {
            kind: TableKind::Education,
            index: 0,
        },
        TableTarget {
            kind: TableKind::Skills,
            index: 1,
        },
        TableTarget {
            kind: TableKind::Experience,
            index: 2,
        },
    ],
    photo_step: false,
    empty_row_rule: EmptyRowRule::AnyCellEmpty,
};

static CLIENT: VariantConfig = VariantConfig {
    key: "client",
    template_file: "client_format.docx",
    output_dir: "resume_client",
    fields: &[
        FieldKind::Summary,
        FieldKind::ProjectExperience,
        FieldKind::TechnicalSkills,
        FieldKind::Certifications,
        FieldKind::Education,
    ],
    placeholders: &[
        Placeholder {
            token: "{{SUMMARY}}",
            field: FieldKind::Summary,
        },
        Placeholder {
            token: "{{SKILLS}}",
            field: FieldKind::TechnicalSkills,
        },
        Placeholder {
            token: "{{PROJECT_EXPERIENCE}}",
            field: FieldKind::ProjectExperience,
        },
        Placeholder {
            token: "{{CERTIFICATIONS}}",
            field: FieldKind::Certifications,
        },
    ],
    tables: &[TableTarget {
        kind: TableKind::Education,
        index: 0,
    }],
    photo_step: false,
    empty_row_rule: EmptyRowRule::AnyCellEmpty,
};

static CLIENT_PHOTO: VariantConfig = VariantConfig {
    key: "client_photo",
    template_file: "client_format_photo.docx",
    output_dir: "resume_client_photo",
    fields: &[
        FieldKind::Name,
        FieldKind::Summary,
        FieldKind::TechnicalSkills,
        FieldKind::Education,
        FieldKind::WorkExperience,
    ],
    placeholders: &[
        Placeholder {
            token: "{{NAME}}",
            field: FieldKind::Name,
        },
        Placeholder {
            token: "{{SUMMARY}}",
            field: FieldKind::Summary,
        },
    ],
    tables: &[
        TableTarget {
            kind: TableKind::Skills,
            index: 0,
        },
        TableTarget {
            kind: TableKind::Education,
            index: 1,
        },
        TableTarget {
            kind: TableKind::Experience,
            index: 2,
        },
    ],
    photo_step: true,
    empty_row_rule: EmptyRowRule::AnyCellEmpty,
};
