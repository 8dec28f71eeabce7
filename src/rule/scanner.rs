//! Hook call scanning.

use crate::tokens::{TokenKind, TokenStream};

/// A call-identifier token naming a configured hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCallSite {
    pub token_index: usize,
    pub name: String,
}

/// Yield every hook call site in the stream, in token order.
pub fn scan_hook_calls<'a, S, H>(stream: &'a S, hooks: &'a [H]) -> impl Iterator<Item = HookCallSite> + 'a
where
    S: TokenStream + ?Sized + 'a,
    H: AsRef<str> + 'a,
{
    stream
        .tokens()
        .iter()
        .filter(|t| t.kind == TokenKind::CallIdentifier)
        .filter(move |t| names_hook(hooks, &t.content))
        .map(|t| HookCallSite {
            token_index: t.index,
            name: t.content.clone(),
        })
}

/// Whether the token at `index` is a hook call.
pub fn is_hook_call<S, H>(stream: &S, index: usize, hooks: &[H]) -> bool
where
    S: TokenStream + ?Sized,
    H: AsRef<str>,
{
    stream
        .tokens()
        .get(index)
        .map(|t| t.kind == TokenKind::CallIdentifier && names_hook(hooks, &t.content))
        .unwrap_or(false)
}

/// PHP function names are case-insensitive.
fn names_hook<H: AsRef<str>>(hooks: &[H], name: &str) -> bool {
    hooks.iter().any(|h| h.as_ref().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;

    #[test]
    fn test_scan_default_hooks() {
        let list = tokenize(
            "<?php\ndo_action( 'a' );\nadd_action( 'a', 'f' );\n$v = apply_filters( 'b', $v );\n",
        )
        .unwrap()
        .tokens;
        let sites: Vec<_> = scan_hook_calls(&list, &["do_action", "apply_filters"]).collect();
        let names: Vec<_> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["do_action", "apply_filters"]);
        assert!(is_hook_call(&list, sites[0].token_index, &["do_action"]));
        assert!(!is_hook_call(&list, sites[1].token_index, &["do_action"]));
    }

    #[test]
    fn test_scan_custom_hooks() {
        let list = tokenize("<?php\ndo_action_ref_array( 'a', array() );\ndo_action( 'b' );\n")
            .unwrap()
            .tokens;
        let hooks = vec!["do_action_ref_array".to_string()];
        let sites: Vec<_> = scan_hook_calls(&list, &hooks).collect();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].name, "do_action_ref_array");
    }

    #[test]
    fn test_scan_ignores_case() {
        let list = tokenize("<?php\nDo_Action( 'a' );\nAPPLY_FILTERS( 'b', 1 );\n")
            .unwrap()
            .tokens;
        let names: Vec<_> = scan_hook_calls(&list, &["do_action", "apply_filters"])
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Do_Action", "APPLY_FILTERS"]);
    }

    #[test]
    fn test_scan_empty_stream() {
        let list = crate::tokens::TokenList::default();
        assert_eq!(scan_hook_calls(&list, &["do_action"]).count(), 0);
        assert!(!is_hook_call(&list, 3, &["do_action"]));
    }
}
