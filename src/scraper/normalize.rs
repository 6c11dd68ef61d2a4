//! File-name normalization for paper titles.

/// Punctuation kept as-is in normalized titles.
const KEPT_PUNCTUATION: [char; 4] = ['_', '?', '+', '-'];

/// Turns a paper title into a file-name fragment.
///
/// ASCII letters, digits and `_ ? + -` are kept, each run of whitespace
/// becomes a single `_`, and everything else is dropped. Applying the function
/// to its own output returns it unchanged.
///
/// ```
/// use paperdl_core::normalize_title;
///
/// assert_eq!(normalize_title("Attention Is All You Need"), "Attention_Is_All_You_Need");
/// assert_eq!(normalize_title("Déjà vu: a C++ study?"), "Dj_vu_a_C++_study?");
/// ```
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let mut normalized = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.trim().chars() {
        if c.is_whitespace() {
            pending_separator = true;
        } else if c.is_ascii_alphanumeric() || KEPT_PUNCTUATION.contains(&c) {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(c);
        }
    }

    normalized
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic_title() {
        assert_eq!(
            normalize_title("Meta Compositional Referring Expression Segmentation"),
            "Meta_Compositional_Referring_Expression_Segmentation"
        );
    }

    #[test]
    fn test_normalize_collapses_whitespace_runs() {
        assert_eq!(normalize_title("  A \t\n B  "), "A_B");
    }

    #[test]
    fn test_normalize_drops_other_punctuation() {
        assert_eq!(
            normalize_title("Drop the GAN: In Defense of Patches"),
            "Drop_the_GAN_In_Defense_of_Patches"
        );
        assert_eq!(normalize_title("Is Retain Set All You Need?"), "Is_Retain_Set_All_You_Need?");
        assert_eq!(normalize_title("Once-for-All"), "Once-for-All");
    }

    #[test]
    fn test_normalize_drops_non_ascii() {
        assert_eq!(normalize_title("Über naïve 模型"), "ber_nave");
        assert_eq!(normalize_title("模型"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for title in [
            "Attention Is All You Need",
            "  leading and trailing  ",
            "a_ b __c",
            "C++ -- ?? : ; !",
            "",
            "Über naïve 模型",
        ] {
            let once = normalize_title(title);
            assert_eq!(normalize_title(&once), once, "not idempotent for {title:?}");
        }
    }

    #[test]
    fn test_normalize_output_charset() {
        let out = normalize_title("A (very) [weird] {title} with $ymbols & more!");
        assert!(
            out.chars()
                .all(|c| c.is_ascii_alphanumeric() || KEPT_PUNCTUATION.contains(&c))
        );
    }
}
