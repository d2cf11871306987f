// All oracle prompt constants for field extraction.
// One prompt per semantic field; replace `{resume_text}` before sending.
//
// Composite fields instruct a line-oriented labeled format so the parsers
// stay deterministic; list fields ask for hyphen-prefixed lines, which the
// post-processor later converts into native bullets.

pub const NAME_PROMPT: &str = "Extract the candidate's full name from the resume below. \
Return ONLY the name on a single line, with no labels, punctuation, or commentary.

RESUME:
{resume_text}";

pub const EDUCATION_PROMPT: &str = "Extract the candidate's education history from the resume below.

Return one line per education entry, most recent first, in EXACTLY this format:
Degree: <degree name> | Institution: <institution name> | Years: <start-end>

Leave the value blank after a label when it is not stated in the resume.
Return ONLY these lines, with no commentary.

RESUME:
{resume_text}";

pub const SUMMARY_PROMPT: &str = "Write a professional summary of the candidate from the resume below, \
3 to 5 sentences, third person, plain text. Base it ONLY on facts present in the resume. \
Return ONLY the summary paragraph, with no headings.

RESUME:
{resume_text}";

pub const CERTIFICATIONS_PROMPT: &str = "List the candidate's certifications from the resume below.

Return one certification per line, each line starting with \"- \". \
If the resume lists no certifications, return an empty response. \
Return ONLY the list, with no commentary.

RESUME:
{resume_text}";

pub const TECHNICAL_SKILLS_PROMPT: &str = "Extract the candidate's technical skills from the resume below.

Return the skill names as a comma-separated list, most prominent first. \
Skill names only — no proficiency levels, no commentary.

RESUME:
{resume_text}";

pub const WORK_EXPERIENCE_PROMPT: &str = "Extract the candidate's work experience from the resume below.

Return one line per position, most recent first, in EXACTLY this format:
Organization: <employer> | Role: <job title> | Duration: <start-end>

Leave the value blank after a label when it is not stated in the resume.
Return ONLY these lines, with no commentary.

RESUME:
{resume_text}";

pub const PROJECT_EXPERIENCE_PROMPT: &str = "Extract the candidate's most relevant project experience \
from the resume below.

Return one project per line, each line starting with \"- \" followed by the project name \
and a one-sentence description. Return ONLY the list, with no commentary.

RESUME:
{resume_text}";
