//! Pulling code out of markdown-fenced model output.

use regex::Regex;
use std::sync::OnceLock;

fn fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"```(?:typescript|tsx|ts|javascript|jsx|js)?\n?([\s\S]*?)```")
            .expect("Invalid code fence regex")
    })
}

/// Interior of the first fenced block, trimmed, if there is one.
#[must_use]
pub fn strip_code_fence(text: &str) -> Option<&str> {
    fence()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Extract code from model output.
///
/// Returns the first fenced block's interior, or the whole input when there
/// is no fence. The result is always trimmed, and extracting twice gives the
/// same result as extracting once.
#[must_use]
pub fn extract_code(text: &str) -> String {
    strip_code_fence(text).unwrap_or_else(|| text.trim()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("```tsx\nexport default App;\n```", "export default App;")]
    #[case("```typescript\nconst a = 1;\n```", "const a = 1;")]
    #[case("```ts\nconst a = 1;\n```", "const a = 1;")]
    #[case("```javascript\nlet b;\n```", "let b;")]
    #[case("```jsx\n<div />\n```", "<div />")]
    #[case("```js\nlet c;\n```", "let c;")]
    #[case("```\nplain\n```", "plain")]
    #[case("```no newline```", "no newline")]
    #[case("  just code  \n", "just code")]
    #[case("", "")]
    fn test_extract_code(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_code(input), expected);
    }

    #[test]
    fn test_prose_around_fence_is_dropped() {
        let text = "Here you go:\n```tsx\nimport React from 'react';\nexport default function App() {}\n```\nEnjoy!";
        assert_eq!(
            extract_code(text),
            "import React from 'react';\nexport default function App() {}"
        );
    }

    #[test]
    fn test_first_block_wins() {
        let text = "```tsx\nfirst\n```\n```tsx\nsecond\n```";
        assert_eq!(extract_code(text), "first");
    }

    #[test]
    fn test_unterminated_fence_is_left_alone() {
        let text = "```tsx\nexport default App;";
        assert_eq!(strip_code_fence(text), None);
        assert_eq!(extract_code(text), text);
    }

    #[rstest]
    #[case("```tsx\n  a\n```")]
    #[case("prefix ```js\nb``` suffix")]
    #[case("   no fence   ")]
    #[case("```\n```")]
    fn test_idempotent(#[case] input: &str) {
        let once = extract_code(input);
        assert_eq!(extract_code(&once), once);
    }
}
