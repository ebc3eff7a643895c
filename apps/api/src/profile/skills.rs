use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_SKILLS: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum SkillSetError {
    #[error("at most {max} skills are allowed, got {given}")]
    TooMany { max: usize, given: usize },

    #[error("skills cannot be blank")]
    Blank,
}

/// Ordered, distinct skills, capped at a configured maximum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    /// Validates user input: trims, drops case-insensitive duplicates (first wins)
    /// and rejects blanks or more than `max` distinct skills.
    pub fn parse(skills: Vec<String>, max: usize) -> Result<Self, SkillSetError> {
        let mut distinct: Vec<String> = Vec::with_capacity(skills.len());
        for skill in skills {
            let skill = skill.trim();
            if skill.is_empty() {
                return Err(SkillSetError::Blank);
            }
            if !distinct.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
                distinct.push(skill.to_string());
            }
        }
        if distinct.len() > max {
            return Err(SkillSetError::TooMany {
                max,
                given: distinct.len(),
            });
        }
        Ok(Self(distinct))
    }

    /// Builds a set from stored rows; anything beyond `max` is dropped.
    pub fn from_stored(skills: Vec<String>, max: usize) -> Self {
        let mut distinct: Vec<String> = Vec::new();
        for skill in skills.into_iter().map(|s| s.trim().to_string()) {
            if distinct.len() == max {
                break;
            }
            if !skill.is_empty() && !distinct.iter().any(|s| s.eq_ignore_ascii_case(&skill)) {
                distinct.push(skill);
            }
        }
        Self(distinct)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rendering form used by the CV and prompts: "Rust, SQL, Docker".
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_keeps_order_and_drops_duplicates() {
        let set = SkillSet::parse(strings(&["Rust", " SQL ", "rust", "Docker"]), 10).unwrap();
        assert_eq!(set.as_slice(), &strings(&["Rust", "SQL", "Docker"])[..]);
    }

    #[test]
    fn test_parse_rejects_more_than_max() {
        let err = SkillSet::parse(strings(&["a", "b", "c"]), 2).unwrap_err();
        assert_eq!(err, SkillSetError::TooMany { max: 2, given: 3 });
    }

    #[test]
    fn test_duplicates_do_not_count_towards_cap() {
        assert!(SkillSet::parse(strings(&["a", "A", "b"]), 2).is_ok());
    }

    #[test]
    fn test_parse_rejects_blank_skill() {
        assert_eq!(
            SkillSet::parse(strings(&["Rust", "  "]), 10).unwrap_err(),
            SkillSetError::Blank
        );
    }

    #[test]
    fn test_from_stored_truncates_to_cap() {
        let set = SkillSet::from_stored(strings(&["a", "b", "c", "d"]), 3);
        assert_eq!(set.joined(), "a, b, c");
    }

    #[test]
    fn test_joined_empty_set_is_empty_string() {
        assert_eq!(SkillSet::default().joined(), "");
    }
}
