// Prompt text for the generated CV profile paragraph.
// Each value is inserted exactly once; inserted text is never scanned for placeholders.

pub fn profile_prompt(
    directive: &str,
    skills: &str,
    work: &str,
    education: &str,
    projects: &str,
) -> String {
    format!(
        r#"Write the PROFILE paragraph at the top of a CV, in the implied first person
(no "I"), using only the facts below. Entries of each kind are separated by
"NEXT JOB:", "NEXT DEGREE:" or "NEXT PROJECT:".

{directive}

SKILLS: {skills}

WORK EXPERIENCE: {work}

EDUCATION: {education}

PROJECTS: {projects}"#
    )
}

pub fn tailored_directive(job_description: &str) -> String {
    format!(
        "Tailor the paragraph to the job description below: \
         lead with the experience and skills it asks for, and mirror its key terms where the \
         facts support them.\n\nJOB DESCRIPTION: {job_description}"
    )
}

pub const GENERAL_DIRECTIVE: &str =
    "No target role is given: present the strongest, most recent experience first.";
