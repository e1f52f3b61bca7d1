/// One `!`-terminated TDB statement, pre-split into whitespace tokens.
///
/// `line` is the 1-based line number where the statement begins, kept for
/// error reporting across multi-line statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub line: usize,
    pub tokens: Vec<String>,
}

/// Splits raw TDB text into statements.
///
/// TDB statements end with `!` and freely span lines; lines whose first
/// non-blank character is `$` are comments. A trailing statement without a
/// terminator is dropped, which matches how the format is written in
/// practice (databases end with `!`).
pub fn split_statements(input: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut tokens: Vec<String> = Vec::new();
    let mut start_line = 0usize;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('$') {
            continue;
        }
        for word in line.split_whitespace() {
            let mut rest = word;
            while let Some(bang) = rest.find('!') {
                let before = &rest[..bang];
                if !before.is_empty() {
                    if tokens.is_empty() {
                        start_line = line_no;
                    }
                    tokens.push(before.to_string());
                }
                if !tokens.is_empty() {
                    statements.push(Statement {
                        line: start_line,
                        tokens: std::mem::take(&mut tokens),
                    });
                }
                rest = &rest[bang + 1..];
            }
            if !rest.is_empty() {
                if tokens.is_empty() {
                    start_line = line_no;
                }
                tokens.push(rest.to_string());
            }
        }
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_statements() {
        let input = "PHASE LIQUID % 1 1.0 !\nCONSTITUENT LIQUID :FE,NI: !";
        let statements = split_statements(input);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].tokens[0], "PHASE");
        assert_eq!(statements[1].tokens[0], "CONSTITUENT");
    }

    #[test]
    fn joins_multi_line_statements_and_tracks_the_start_line() {
        let input = "FUNCTION GHSERFE 298.15 +1225.7+124.134*T\n -23.5143*T*LN(T); 1811 Y\n -25383.581; 6000 N !";
        let statements = split_statements(input);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].line, 1);
        assert!(statements[0].tokens.len() >= 7);
    }

    #[test]
    fn skips_comment_and_blank_lines() {
        let input = "$ a database comment\n\nELEMENT FE BCC_A2 55.847 4489 27.28 !\n$ trailing comment";
        let statements = split_statements(input);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].line, 3);
    }

    #[test]
    fn handles_terminator_attached_to_the_last_token() {
        let input = "TYPE_DEFINITION % SEQ *!";
        let statements = split_statements(input);
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].tokens,
            vec!["TYPE_DEFINITION", "%", "SEQ", "*"]
        );
    }

    #[test]
    fn drops_an_unterminated_trailing_fragment() {
        let input = "ELEMENT FE BCC_A2 55.847 4489 27.28 !\nPHASE LIQUID % 1";
        let statements = split_statements(input);
        assert_eq!(statements.len(), 1);
    }
}
