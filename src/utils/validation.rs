use crate::error::{Error, Result};

/// Trims a mandatory free-text reason; blank input is a validation error.
pub fn require_reason(reason: Option<&str>) -> Result<String> {
    match reason.map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r.to_string()),
        _ => Err(Error::BadRequest("A reason is required for this action".into())),
    }
}

/// Normalizes a skill list: trimmed, lowercased, no blanks, no duplicates.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let s = skill.trim().to_lowercase();
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reasons_are_rejected() {
        assert!(require_reason(None).is_err());
        assert!(require_reason(Some("   ")).is_err());
        assert_eq!(require_reason(Some(" spam ")).unwrap(), "spam");
    }

    #[test]
    fn skills_are_deduplicated_case_insensitively() {
        let skills = vec!["Welding".to_string(), " welding ".into(), "".into(), "Driving".into()];
        assert_eq!(normalize_skills(&skills), vec!["welding", "driving"]);
    }
}
