//! Wildcard template matching.
//!
//! Templates contain literal characters and `*`, which matches any run of
//! characters (including none). Matching ignores ASCII case.

/// ## Summary
/// Matches `template` against `literal`.
///
/// Uses a single backtrack point: on mismatch the pattern restarts just after
/// the most recent `*`, which has consumed one more character of the literal.
#[must_use]
pub fn template_match(template: &str, literal: &str) -> bool {
    let pattern: Vec<char> = template.chars().collect();
    let text: Vec<char> = literal.chars().collect();

    let mut p_idx = 0;
    let mut t_idx = 0;
    let mut star: Option<usize> = None;
    let mut star_match = 0;

    while t_idx < text.len() {
        match pattern.get(p_idx) {
            Some('*') => {
                while pattern.get(p_idx) == Some(&'*') {
                    p_idx += 1;
                }
                star = Some(p_idx);
                star_match = t_idx;
            }
            Some(c) if c.eq_ignore_ascii_case(&text[t_idx]) => {
                p_idx += 1;
                t_idx += 1;
            }
            _ => {
                let Some(resume) = star else {
                    return false;
                };
                star_match += 1;
                p_idx = resume;
                t_idx = star_match;
            }
        }
    }

    pattern[p_idx..].iter().all(|c| *c == '*')
}
