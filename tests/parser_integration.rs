//! Integration tests for the tree-sitter-php token adapter.

use std::path::PathBuf;

use hookdoc::parser::{tokenize, PhpTokenizer, Tokenizer};
use hookdoc::tokens::{TokenKind, TokenStream};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

#[test]
fn test_fixtures_roundtrip_without_errors() {
    for entry in std::fs::read_dir(testdata_path()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().map(|e| e != "php").unwrap_or(true) {
            continue;
        }
        let source = std::fs::read_to_string(&path).unwrap();
        let parsed = PhpTokenizer.tokenize(&source).unwrap();
        assert_eq!(parsed.tokens.source(), source, "{:?}", path);
        assert!(!parsed.has_errors, "{:?} should parse cleanly", path);
    }
}

#[test]
fn test_newlines_are_separate_tokens() {
    let tokens = tokenize("<?php\n$a = 1; // x\n\n/*\n * b\n */\n")
        .unwrap()
        .tokens;
    for token in tokens.tokens() {
        if token.content.contains('\n') {
            assert!(token.is_newline(), "{:?} mixes a newline with text", token);
            assert_eq!(token.kind, TokenKind::Whitespace);
        }
    }
}

#[test]
fn test_lines_are_one_based_and_ordered() {
    let source = "<?php\n\n\tdo_action( 'a' );\n";
    let tokens = tokenize(source).unwrap().tokens;
    assert_eq!(tokens.tokens()[0].line, 1);
    let call = tokens
        .find_next(&[TokenKind::CallIdentifier], 0, None, false)
        .unwrap();
    assert_eq!(tokens.tokens()[call].line, 3);
    assert!(tokens
        .tokens()
        .windows(2)
        .all(|w| w[0].line <= w[1].line && w[0].index + 1 == w[1].index));
}

#[test]
fn test_namespaced_and_variable_calls() {
    let tokens = tokenize("<?php\n\\do_action( 'a' );\n$fn( 'b' );\nMy\\Ns\\apply_filters( 'c', 1 );\n")
        .unwrap()
        .tokens;
    let calls: Vec<_> = tokens
        .tokens()
        .iter()
        .filter(|t| t.kind == TokenKind::CallIdentifier)
        .map(|t| t.content.as_str())
        .collect();
    assert_eq!(calls, vec!["do_action", "apply_filters"]);
}

#[test]
fn test_syntax_errors_are_reported() {
    let parsed = tokenize("<?php\ndo_action( 'a' \n").unwrap();
    assert!(parsed.has_errors);
    assert_eq!(parsed.tokens.source(), "<?php\ndo_action( 'a' \n");
}

#[test]
fn test_html_around_php() {
    let source = "<ul>\n\t<li><?php do_action( 'item' ); ?></li>\n</ul>\n";
    let tokens = tokenize(source).unwrap().tokens;
    assert_eq!(tokens.source(), source);
    let open = tokens
        .tokens()
        .iter()
        .find(|t| t.is_open_tag())
        .expect("open tag token");
    assert_eq!(open.line, 2);
    assert!(tokens.tokens().iter().any(|t| t.is_close_tag()));
}
