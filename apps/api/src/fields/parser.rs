//! Deterministic parsers over free-text oracle responses.
//!
//! Parsing is best effort and never fails: a sub-field that cannot be
//! located becomes an empty string rather than dropping the entry, so the
//! degree/institution/years triples stay index-aligned however mangled the
//! response is.

use serde::Serialize;

/// One education entry. The three sub-fields describe the same entry;
/// unresolvable sub-fields are empty strings, never missing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub years: String,
}

/// One position held: employer, title, and the period worked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperienceEntry {
    pub organization: String,
    pub role: String,
    pub duration: String,
}

const DEGREE_LABELS: [&str; 2] = ["degree", "qualification"];
const INSTITUTION_LABELS: [&str; 4] = ["institution", "university", "college", "school"];
const YEARS_LABELS: [&str; 4] = ["years", "year", "duration", "graduation"];
const ORGANIZATION_LABELS: [&str; 3] = ["organization", "company", "employer"];
const ROLE_LABELS: [&str; 4] = ["role", "title", "position", "designation"];
const DURATION_LABELS: [&str; 4] = ["duration", "period", "dates", "years"];

/// Splits an education response into aligned entries, one per line.
///
/// Recognizes the labeled `Degree: … | Institution: … | Years: …` pattern
/// first, then falls back to a year-range scan with comma-positional
/// splitting, and finally treats the whole line as a degree name.
pub fn parse_education(text: &str) -> Vec<EducationEntry> {
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = strip_list_marker(line);
        if line.is_empty() || is_section_heading(line, "education") {
            continue;
        }

        let degree = labeled_value(line, &DEGREE_LABELS);
        let institution = labeled_value(line, &INSTITUTION_LABELS);
        let years = labeled_value(line, &YEARS_LABELS);

        if degree.is_some() || institution.is_some() || years.is_some() {
            entries.push(EducationEntry {
                degree: degree.unwrap_or_default(),
                institution: institution.unwrap_or_default(),
                years: years.unwrap_or_default(),
            });
            continue;
        }

        if let Some((range, remainder)) = split_year_range(line) {
            let mut parts = remainder.splitn(2, ',').map(str::trim);
            entries.push(EducationEntry {
                degree: parts.next().unwrap_or("").to_string(),
                institution: parts.next().unwrap_or("").to_string(),
                years: range,
            });
            continue;
        }

        entries.push(EducationEntry {
            degree: line.to_string(),
            institution: String::new(),
            years: String::new(),
        });
    }

    entries
}

/// Splits a skills response into an ordered list of skill names.
/// Commas and newlines both separate; bullet markers and labels are
/// stripped; blanks are dropped; order is preserved.
pub fn parse_skills(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .map(|line| strip_label(line, &["skills", "technical skills"]))
        .flat_map(|line| line.split(',').collect::<Vec<_>>())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.chars().any(char::is_alphanumeric))
        .map(str::to_string)
        .collect()
}

/// Splits a work-experience response into aligned entries, one per line.
pub fn parse_work_experience(text: &str) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = strip_list_marker(line);
        if line.is_empty() || is_section_heading(line, "experience") {
            continue;
        }

        let organization = labeled_value(line, &ORGANIZATION_LABELS);
        let role = labeled_value(line, &ROLE_LABELS);
        let duration = labeled_value(line, &DURATION_LABELS);

        if organization.is_some() || role.is_some() || duration.is_some() {
            entries.push(ExperienceEntry {
                organization: organization.unwrap_or_default(),
                role: role.unwrap_or_default(),
                duration: duration.unwrap_or_default(),
            });
            continue;
        }

        // "Senior Engineer at Acme, 2019-2023" and similar prose lines.
        let (duration, remainder) = match split_year_range(line) {
            Some((range, remainder)) => (range, remainder),
            None => (String::new(), line.to_string()),
        };
        if let Some((role, organization)) = remainder.split_once(" at ") {
            entries.push(ExperienceEntry {
                organization: organization.trim_matches([' ', ','].as_slice()).to_string(),
                role: role.trim().to_string(),
                duration,
            });
        } else {
            let mut parts = remainder.splitn(2, ',').map(str::trim);
            entries.push(ExperienceEntry {
                organization: parts.next().unwrap_or("").to_string(),
                role: parts.next().unwrap_or("").to_string(),
                duration,
            });
        }
    }

    entries
}

// ────────────────────────────────────────────────────────────────────────────
// Shared splitting helpers
// ────────────────────────────────────────────────────────────────────────────

/// Drops a leading bullet marker (`-`, `*`, `•`) and surrounding space.
fn strip_list_marker(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['-', '*', '\u{2022}', '\u{2013}'])
        .trim()
}

/// Drops a leading `label:` prefix, case-insensitively.
fn strip_label<'a>(line: &'a str, labels: &[&str]) -> &'a str {
    for label in labels {
        if line.is_char_boundary(label.len())
            && line[..label.len()].eq_ignore_ascii_case(label)
        {
            if let Some(rest) = line[label.len()..].trim_start().strip_prefix(':') {
                return rest.trim_start();
            }
        }
    }
    line
}

/// True for bare section headings like `Education` or `Education:`.
fn is_section_heading(line: &str, heading: &str) -> bool {
    line.trim_end_matches(':').trim().eq_ignore_ascii_case(heading)
}

/// Finds `label: value` within a `|`/`;`-segmented line, case-insensitively.
/// Returns the trimmed value, which may be empty when the label is present
/// but the value is blank.
fn labeled_value(line: &str, labels: &[&str]) -> Option<String> {
    for segment in line.split(['|', ';']) {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        if labels.iter().any(|l| key == *l) {
            return Some(value.trim().to_string());
        }
    }
    None
}

/// Extracts a `2016-2020` / `2019 – present` style range from a line,
/// returning the range and the remaining text.
fn split_year_range(line: &str) -> Option<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i + 4 <= chars.len() {
        if chars[i..i + 4].iter().all(char::is_ascii_digit)
            && (i == 0 || !chars[i - 1].is_ascii_digit())
        {
            // Candidate start year; look for a separator and an end marker.
            let mut j = i + 4;
            while j < chars.len()
                && (chars[j] == ' ' || chars[j] == '-' || chars[j] == '\u{2013}' || chars[j] == '\u{2014}')
            {
                j += 1;
            }
            let rest: String = chars[j..].iter().collect();
            let starts_with_ci = |needle: &str| {
                rest.get(..needle.len())
                    .map(|s| s.eq_ignore_ascii_case(needle))
                    .unwrap_or(false)
            };
            let end_len = if rest
                .get(..4)
                .map(|s| s.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or(false)
            {
                Some(4)
            } else if starts_with_ci("present") {
                Some("present".len())
            } else if starts_with_ci("current") {
                Some("current".len())
            } else {
                None
            };
            if let Some(end_len) = end_len {
                if j > i + 4 {
                    let range: String = chars[i..j].iter().collect::<String>()
                        + &rest[..end_len];
                    let remainder = format!(
                        "{}{}",
                        chars[..i].iter().collect::<String>(),
                        &rest[end_len..]
                    );
                    let remainder = remainder
                        .trim_matches([' ', ',', '(', ')'].as_slice())
                        .to_string();
                    return Some((range.trim().to_string(), remainder));
                }
            }
        }
        i += 1;
    }
    None
}
