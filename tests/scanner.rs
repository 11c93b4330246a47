#[cfg(test)]
mod scanner_tests {
    use rox::error::{LoxError, Result};
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(std::result::Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo < Bar { init() { this.x = super.y; } } _tmp1 orchid",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LESS, "<"),
                (TokenType::IDENTIFIER, "Bar"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::THIS, "this"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::EQUAL, "="),
                (TokenType::SUPER, "super"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "y"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::IDENTIFIER, "_tmp1"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_comments_and_lines() {
        let source = "// leading comment\nvar a = 1; // trailing\n\n// last line without newline";
        let tokens: Vec<Token> = Scanner::new(source).filter_map(|r| r.ok()).collect();

        let summary: Vec<(&str, usize)> = tokens
            .iter()
            .map(|t| (t.token_type.name(), t.line))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("VAR", 2),
                ("IDENTIFIER", 2),
                ("EQUAL", 2),
                ("NUMBER", 2),
                ("SEMICOLON", 2),
                ("EOF", 4),
            ]
        );
    }

    #[test]
    fn test_scanner_05_literals_and_display() {
        let tokens: Vec<Token> = Scanner::new("\"hi there\" 42 3.25 12.")
            .filter_map(|r| r.ok())
            .collect();

        let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            rendered,
            vec![
                "STRING \"hi there\" hi there",
                "NUMBER 42 42.0",
                "NUMBER 3.25 3.25",
                "NUMBER 12 12.0",
                "DOT . null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_scanner_06_multiline_string_counts_lines() {
        let tokens: Vec<Token> = Scanner::new("\"a\nb\"\nx").filter_map(|r| r.ok()).collect();

        assert!(matches!(&tokens[0].token_type, TokenType::STRING(s) if s == "a\nb"));
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        let results: Vec<_> = scanner.collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "line 1: Unexpected character: $",
                "line 1: Unexpected character: #",
            ]
        );

        fn assert_token_matches(result: &Result<Token>, expected_type: TokenType, expected_lexeme: &str) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = Scanner::new("print \"oops\n").scan_all();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_type, TokenType::EOF);

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LoxError::Lex { line: 2, .. }));
        assert_eq!(errors[0].to_string(), "line 2: Unterminated string.");
    }

    #[test]
    fn test_non_ascii_character_is_one_error() {
        let (tokens, errors) = Scanner::new("1 é 2").scan_all();

        assert_eq!(tokens.len(), 3);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "line 1: Unexpected character: é");
    }

    #[test]
    fn test_scanner_is_fused() {
        let mut scanner = Scanner::new("");

        assert!(matches!(scanner.next(), Some(Ok(ref t)) if t.token_type == TokenType::EOF));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
