//! Splitting of SQL scripts into single statements.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

/// Split a script on `;`, ignoring separators inside literals, quoted
/// identifiers and comments.
///
/// Comments are dropped, statements are trimmed, and empty statements are
/// skipped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Code;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                ';' => flush(&mut current, &mut statements),
                '\'' => {
                    state = State::SingleQuoted;
                    current.push(c);
                }
                '"' => {
                    state = State::DoubleQuoted;
                    current.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => current.push(c),
            },
            // Doubled quotes are an escape; leaving and re-entering the state
            // handles them without lookahead.
            State::SingleQuoted => {
                current.push(c);
                if c == '\'' {
                    state = State::Code;
                }
            }
            State::DoubleQuoted => {
                current.push(c);
                if c == '"' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    current.push(c);
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    current.push(' ');
                    state = State::Code;
                }
            }
        }
    }
    flush(&mut current, &mut statements);
    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        assert_eq!(
            split_statements("SELECT 1; SELECT 2;\n\n"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn test_separators_in_literals() {
        let script = r#"INSERT INTO t (a) VALUES ('x;y'); SELECT "odd;name" FROM t"#;
        assert_eq!(
            split_statements(script),
            vec!["INSERT INTO t (a) VALUES ('x;y')", r#"SELECT "odd;name" FROM t"#]
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            split_statements("SELECT 'it''s; fine'; SELECT 2"),
            vec!["SELECT 'it''s; fine'", "SELECT 2"]
        );
    }

    #[test]
    fn test_comments_dropped() {
        let script = "-- leading; comment\nSELECT 1; /* block; */ SELECT 2 -- trailing";
        assert_eq!(split_statements(script), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_empty_script() {
        assert!(split_statements("  ;; -- nothing\n").is_empty());
    }
}
