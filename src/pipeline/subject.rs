//! Subject Normalizer — strips one reply/forward prefix.

/// Returned when the incoming subject is absent or effectively empty.
pub const NO_SUBJECT: &str = "No Subject";

/// Reply/forward prefixes, checked in order.
const PREFIXES: [&str; 6] = ["Re:", "RE:", "Fwd:", "FWD:", "FW:", "fw:"];

/// Normalize a subject line for the draft.
///
/// Strips at most one leading prefix, case-insensitively, first match
/// in `PREFIXES` order. Deliberately single-pass: `"Re: Fwd: X"`
/// becomes `"Fwd: X"`, never `"X"`.
pub fn clean_subject(subject: Option<&str>) -> String {
    let subject = match subject {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return NO_SUBJECT.to_string(),
    };

    let lower = subject.to_lowercase();
    for prefix in PREFIXES {
        if lower.starts_with(&prefix.to_lowercase()) {
            return subject[prefix.len()..].trim().to_string();
        }
    }
    subject.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_re_prefix() {
        assert_eq!(clean_subject(Some("Re: Meeting")), "Meeting");
        assert_eq!(clean_subject(Some("RE: Project Update")), "Project Update");
    }

    #[test]
    fn strips_forward_prefixes() {
        assert_eq!(clean_subject(Some("Fwd: Invoice")), "Invoice");
        assert_eq!(clean_subject(Some("FW: Invoice")), "Invoice");
        assert_eq!(clean_subject(Some("fw: Invoice")), "Invoice");
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert_eq!(clean_subject(Some("rE: Meeting")), "Meeting");
        assert_eq!(clean_subject(Some("fWd: Meeting")), "Meeting");
    }

    #[test]
    fn nested_prefixes_stripped_once() {
        assert_eq!(clean_subject(Some("Re: Fwd: Quarterly")), "Fwd: Quarterly");
    }

    #[test]
    fn plain_subject_untouched() {
        assert_eq!(clean_subject(Some("Quarterly numbers")), "Quarterly numbers");
    }

    #[test]
    fn absent_subject_gets_placeholder() {
        assert_eq!(clean_subject(None), NO_SUBJECT);
    }

    #[test]
    fn whitespace_only_subject_gets_placeholder() {
        assert_eq!(clean_subject(Some("  ")), NO_SUBJECT);
        assert_eq!(clean_subject(Some("")), NO_SUBJECT);
    }

    #[test]
    fn prefix_only_subject_strips_to_empty() {
        // The input itself was non-empty, so no placeholder applies.
        assert_eq!(clean_subject(Some("Re:   ")), "");
    }

    #[test]
    fn prefix_without_colon_untouched() {
        assert_eq!(clean_subject(Some("Regarding the offer")), "Regarding the offer");
    }
}
