use crate::session::Session;

/// How one input-buffer update was judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The engine is not running; nothing was evaluated
    Ignored,
    /// Buffer did not grow past the committed prefix (deletion or empty)
    NoNewInput,
    /// More than one new character arrived and nothing was evaluated.
    ///
    /// The caller must reset the input to `buffer`, which holds exactly
    /// `cursor + 1` characters, and submit it again; the pending character
    /// is only judged on that resubmission.
    Truncated { buffer: String },
    Correct,
    /// The caller must drop the typed character and reset the input to `buffer`
    Incorrect {
        expected: char,
        typed: char,
        buffer: String,
    },
}

/// Judge an input buffer against the session and apply the counter changes.
///
/// Only the last character is evaluated, and only when the buffer holds
/// exactly one character beyond the committed prefix.
pub fn apply_input(session: &mut Session, buffer: &str) -> Verdict {
    let typed_len = buffer.chars().count();
    let cursor = session.cursor;

    if typed_len > cursor + 1 {
        return Verdict::Truncated {
            buffer: buffer.chars().take(cursor + 1).collect(),
        };
    }
    if typed_len <= cursor {
        return Verdict::NoNewInput;
    }

    let (Some(typed), Some(expected)) = (buffer.chars().last(), session.expected_char()) else {
        return Verdict::NoNewInput;
    };

    session.total_attempts += 1;
    if typed == expected {
        session.correct_count += 1;
        session.cursor += 1;
        Verdict::Correct
    } else {
        Verdict::Incorrect {
            expected,
            typed,
            buffer: buffer.chars().take(cursor).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_correct_advances() {
        let mut session = Session::new("ab", 60);

        assert_eq!(apply_input(&mut session, "a"), Verdict::Correct);
        assert_eq!(session.cursor, 1);
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.total_attempts, 1);
    }

    #[test]
    fn test_incorrect_holds_cursor() {
        let mut session = Session::new("ab", 60);
        apply_input(&mut session, "a");

        let verdict = apply_input(&mut session, "ax");
        assert_matches!(
            verdict,
            Verdict::Incorrect { expected: 'b', typed: 'x', ref buffer } if buffer == "a"
        );
        assert_eq!(session.cursor, 1);
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.total_attempts, 2);
    }

    #[test]
    fn test_whitespace_is_exact() {
        let mut session = Session::new("a b", 60);
        apply_input(&mut session, "a");

        assert_matches!(apply_input(&mut session, "a\t"), Verdict::Incorrect { .. });
        assert_eq!(apply_input(&mut session, "a "), Verdict::Correct);
    }

    #[test]
    fn test_burst_is_truncated_without_counting() {
        let mut session = Session::new("abcd", 60);
        apply_input(&mut session, "a");

        let verdict = apply_input(&mut session, "abcd");
        assert_eq!(
            verdict,
            Verdict::Truncated {
                buffer: "ab".to_string()
            }
        );
        assert_eq!(session.cursor, 1);
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.total_attempts, 1);
    }

    #[test]
    fn test_deletion_is_not_evaluated() {
        let mut session = Session::new("abcd", 60);
        apply_input(&mut session, "a");
        apply_input(&mut session, "ab");

        assert_eq!(apply_input(&mut session, "a"), Verdict::NoNewInput);
        assert_eq!(apply_input(&mut session, ""), Verdict::NoNewInput);
        assert_eq!(session.cursor, 2);
        assert_eq!(session.total_attempts, 2);
    }

    #[test]
    fn test_multibyte_chars_count_once() {
        let mut session = Session::new("né", 60);
        apply_input(&mut session, "n");

        assert_eq!(apply_input(&mut session, "né"), Verdict::Correct);
        assert!(session.is_complete());
    }
}
