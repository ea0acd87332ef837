/// Clean model output so it can be pasted straight into the group chat
///
/// Square brackets are dropped and a `" - "` separator is rewritten to the
/// expected `" : "`. Whitespace, numbering and casing are left alone.
pub fn sanitize_order_output(input: &str) -> String {
    let mut output = input.replace(['[', ']'], "");
    // Overlapping runs like " - - " leave a fresh " - " after one pass.
    while output.contains(" - ") {
        output = output.replace(" - ", " : ");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_brackets_and_dash() {
        assert_eq!(
            sanitize_order_output("1. miftah - nasi 1, [lauk 1]"),
            "1. miftah : nasi 1, lauk 1"
        );
    }

    #[test]
    fn test_sanitize_leaves_clean_output_alone() {
        let text = "1. farid : nasi 1, ayam goreng\n2. miftah : nasi 1, fillet ayam, tempe";
        assert_eq!(sanitize_order_output(text), text);
    }

    #[test]
    fn test_sanitize_keeps_whitespace_and_case() {
        let text = "  1. Farid : Nasi 1,  Tempe\r\n\n2. MIFTAH : nasi 1, udang  ";
        assert_eq!(sanitize_order_output(text), text);
    }

    #[test]
    fn test_sanitize_only_spaced_dash() {
        // Hyphenated words and dashes without surrounding spaces are not separators.
        assert_eq!(
            sanitize_order_output("1. miftah: nasi 1, ati-ampela, tahu -goreng"),
            "1. miftah: nasi 1, ati-ampela, tahu -goreng"
        );
    }

    #[test]
    fn test_sanitize_multiple_entries() {
        let raw = "1. farid - [nasi 1], [ayam goreng]\n2. miftah - [nasi 1], [udang], [tempe]";
        assert_eq!(
            sanitize_order_output(raw),
            "1. farid : nasi 1, ayam goreng\n2. miftah : nasi 1, udang, tempe"
        );
    }

    #[test]
    fn test_sanitize_bracket_inside_separator() {
        // Removing brackets can produce a new " - " which is then normalized.
        assert_eq!(sanitize_order_output("1. miftah [-] nasi 1"), "1. miftah : nasi 1");
    }

    #[test]
    fn test_sanitize_overlapping_dashes() {
        assert_eq!(sanitize_order_output("a - - b"), "a : : b");
    }

    #[test]
    fn test_sanitize_idempotent() {
        let inputs = [
            "",
            "[]",
            "1. miftah - nasi 1, [lauk 1]",
            "a - - b",
            "x  -  y [z] - ",
            "1. a - b - c\n2. [d] - [e]",
        ];
        for input in inputs {
            let once = sanitize_order_output(input);
            assert_eq!(sanitize_order_output(&once), once, "input: {:?}", input);
        }
    }
}
