//! SQL statement splitting.
//!
//! Dump files contain string literals with embedded semicolons and
//! quotes, plus line and block comments; splitting naively on `;` is
//! wrong and is the bug this lexer exists to avoid. Statements keep
//! their terminator, comments and the whitespace around them; the only
//! text ever dropped is blank fragments (whitespace and bare
//! terminators), which MySQL would reject as empty queries.

/// Lexer state while scanning dump text.
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

/// Splits SQL text into individually executable statements.
///
/// A semicolon terminates a statement only outside quotes and comments
/// and is included in the emitted text. A trailing fragment with
/// non-whitespace content is emitted even without a terminator;
/// fragments that are empty or whitespace-only aside from their
/// terminator are never emitted.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        match state {
            State::Normal => match ch {
                '\'' => state = State::SingleQuote,
                '"' => state = State::DoubleQuote,
                '-' if chars.peek() == Some(&'-') => {
                    current.push('-');
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    current.push('*');
                    chars.next();
                    state = State::BlockComment;
                }
                ';' => {
                    // The terminator itself does not make a fragment
                    // worth executing.
                    if current[..current.len() - 1].trim().is_empty() {
                        current.clear();
                    } else {
                        statements.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            State::SingleQuote => match ch {
                // Backslash consumes the next character verbatim.
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '\'' => state = State::Normal,
                _ => {}
            },
            State::DoubleQuote => match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '"' => state = State::Normal,
                _ => {}
            },
            State::LineComment => {
                if ch == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    current.push('/');
                    chars.next();
                    state = State::Normal;
                }
            }
        }
    }

    if !current.trim().is_empty() {
        statements.push(current);
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn basic_split() {
        let stmts = split_statements("SELECT 1;\nSELECT 2;");
        assert_eq!(stmts, vec!["SELECT 1;", "\nSELECT 2;"]);
    }

    #[test]
    fn semicolon_in_single_quotes_is_opaque() {
        let stmts = split_statements("INSERT INTO t VALUES ('a;b');");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0], "INSERT INTO t VALUES ('a;b');");
    }

    #[test]
    fn semicolon_in_double_quotes_is_opaque() {
        let stmts = split_statements(r#"INSERT INTO t VALUES ("x;y");"#);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let stmts = split_statements(r"INSERT INTO t VALUES ('don\'t; stop');");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0], r"INSERT INTO t VALUES ('don\'t; stop');");
    }

    #[test]
    fn line_comment_hides_semicolon_until_newline() {
        let stmts = split_statements("SELECT 1 -- trailing; not a split\n;SELECT 2;");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "SELECT 1 -- trailing; not a split\n;");
    }

    #[test]
    fn block_comment_hides_semicolon() {
        let stmts = split_statements("SELECT /* a;b */ 1; SELECT 2;");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "SELECT /* a;b */ 1;");
    }

    #[test]
    fn block_comment_spans_lines() {
        let stmts = split_statements("/* header\n; still comment\n*/ SELECT 1;");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn trailing_fragment_without_terminator_is_emitted() {
        let stmts = split_statements("SELECT 1; SELECT 2");
        assert_eq!(stmts, vec!["SELECT 1;", " SELECT 2"]);
    }

    #[test]
    fn whitespace_only_tail_is_dropped() {
        let stmts = split_statements("SELECT 1;\n  \n");
        assert_eq!(stmts, vec!["SELECT 1;"]);
    }

    #[test]
    fn bare_terminators_are_dropped() {
        assert!(split_statements(";;").is_empty());
        assert!(split_statements(" ; \n;").is_empty());
        assert_eq!(split_statements("SELECT 1;  ;"), vec!["SELECT 1;"]);
        assert_eq!(split_statements(";SELECT 1;"), vec!["SELECT 1;"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("   \n\t").is_empty());
    }

    #[test]
    fn split_is_lossless_on_dump_shaped_text() {
        let sql = "-- dump for quest_rewards\nTRUNCATE TABLE `quest_rewards`;\n\
                   INSERT INTO `quest_rewards` VALUES (1, 'a;b', \"c\\\"d\");\n\
                   /* block; comment */\nINSERT INTO `quest_rewards` VALUES (2, 'x');";
        let stmts = split_statements(sql);
        assert_eq!(stmts.concat(), sql);
    }

    proptest! {
        /// Rejoining the emitted statements reproduces the input except
        /// for blank fragments: every dropped character is whitespace
        /// or a terminator, and every emitted character comes from the
        /// input in order.
        #[test]
        fn splitting_drops_only_blank_fragments(
            parts in prop::collection::vec("[a-zA-Z0-9_ ,()'\";*/\n\\\\-]{0,40}", 1..8)
        ) {
            let sql = format!("{}X", parts.concat());
            let rejoined = split_statements(&sql).concat();

            let mut emitted = rejoined.chars().peekable();
            for ch in sql.chars() {
                if emitted.peek() == Some(&ch) {
                    emitted.next();
                } else {
                    prop_assert!(
                        ch.is_whitespace() || ch == ';',
                        "dropped non-blank char {:?}",
                        ch
                    );
                }
            }
            prop_assert!(emitted.peek().is_none());
        }
    }
}
