// Prompt constants for the extraction module.
// The image path fuses full-document extraction and summary shaping into a
// single oracle call; PDF and DOCX paths never touch the oracle.

/// Instruction sent alongside an uploaded resume image.
pub const IMAGE_EXTRACTION_PROMPT: &str = "You are a resume analyzer. \
    Extract every detail from the resume image and format it as plain text. \
    Return a summary that includes personal info, skills, education, \
    experience, certifications, and any relevant projects.";
