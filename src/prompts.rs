use crate::types::{GenerationRequest, Mode};

/// Name the generated entry is written for
pub const ORDER_OWNER: &str = "miftah";

const INTRO: &str =
    "You are an order formatter for an Indonesian office lunch catering WhatsApp group.";

/// Rules every generated entry must follow, shared by all modes.
///
/// The protein list is a hint for the model, not a whitelist.
fn order_rules() -> String {
    format!(
        r#"USER: {owner}
ALWAYS USE: "nasi 1" (never "nasi 1/2")
LAUK COUNT: Exactly 2-3 lauk (no more, no less)
PROTEIN REQUIREMENT: At least 1 protein dish (e.g., fillet ayam, ati ampela, dendeng sapi, udang, ikan, ceker)"#,
        owner = ORDER_OWNER
    )
}

/// Output format constraints, shared by all modes.
///
/// The result is pasted into the chat without any cleanup.
fn output_rules() -> String {
    format!(
        r#"CRITICAL OUTPUT RULES:
- Output ONLY the numbered order list - nothing else
- NO introductory text (e.g., "Here's the order", "Below is")
- NO explanatory comments, notes, or bullet points
- NO concluding remarks or explanations
- NO markdown formatting (no code blocks, no bold text)
- The output must be ready to paste directly into WhatsApp without any cleanup

FORMAT REQUIREMENTS:
- Use ":" as separator between name and items (e.g., "1. {owner} : nasi 1, lauk 1")
- Use "," as separator between items
- NEVER use square brackets [] around items
- Use plain text format only: 1. name : item1, item2, item3"#,
        owner = ORDER_OWNER
    )
}

/// Build the prompt for a validated request
pub fn build_order_prompt(request: &GenerationRequest) -> String {
    build_prompt(request.mode, &request.menu_text, &request.current_orders)
}

/// Build the full instruction text for one generation
///
/// Never fails; blank inputs are embedded as-is.
pub fn build_prompt(mode: Mode, menu_text: &str, current_orders: &str) -> String {
    match mode {
        Mode::FirstTouch => format!(
            r#"{INTRO}

Your task: Generate the FIRST order for a new lunch order.

{rules}

AVAILABLE MENU:
{menu_text}

OUTPUT FORMAT: 1. {owner} : nasi 1, lauk 1, lauk 2
Start immediately with "1." and output exactly one entry.

{output}

Generate ONLY the first numbered entry for {owner}. Output nothing else."#,
            rules = order_rules(),
            output = output_rules(),
            owner = ORDER_OWNER,
        ),
        Mode::Nitro => format!(
            r#"{INTRO}

Your task: Generate a WhatsApp order message that:
1. Preserves all existing orders before the user
2. Appends the user's order at the next number
3. Maintains the exact format of previous orders

{rules}

CURRENT ORDERS:
{current_orders}

NOTE: No menu provided. Choose {owner}'s order from dishes that appear in existing orders above.

{output}

Generate ONLY the numbered order list with {owner}'s order appended. Output nothing else."#,
            rules = order_rules(),
            output = output_rules(),
            owner = ORDER_OWNER,
        ),
        Mode::Normal => {
            let menu_section = if menu_text.trim().is_empty() {
                String::new()
            } else {
                format!("AVAILABLE MENU:\n{menu_text}\n\n")
            };
            format!(
                r#"{INTRO}

Your task: Generate a WhatsApp order message that:
1. Preserves all existing orders before the user
2. Appends the user's order at the next number
3. Maintains the exact format of previous orders

{rules}

OUTPUT FORMAT: Match the format of existing orders exactly.

{menu_section}CURRENT ORDERS:
{current_orders}

{output}

Generate ONLY the numbered order list with {owner}'s order appended. Output nothing else."#,
                rules = order_rules(),
                output = output_rules(),
                owner = ORDER_OWNER,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS: &str = "1. farid : nasi 1, ayam goreng\n2. budi : nasi 1, tempe, tahu";
    const MENU: &str = "Cah buncis\nFillet ayam\nTempe orek";

    #[test]
    fn test_normal_embeds_menu_and_orders() {
        let prompt = build_prompt(Mode::Normal, MENU, ORDERS);
        assert!(prompt.contains(&format!("AVAILABLE MENU:\n{}", MENU)));
        assert!(prompt.contains(&format!("CURRENT ORDERS:\n{}", ORDERS)));
        assert!(prompt.contains("Preserves all existing orders"));
    }

    #[test]
    fn test_normal_without_menu_skips_menu_section() {
        let prompt = build_prompt(Mode::Normal, "  ", ORDERS);
        assert!(!prompt.contains("AVAILABLE MENU"));
        assert!(prompt.contains(&format!("CURRENT ORDERS:\n{}", ORDERS)));
    }

    #[test]
    fn test_nitro_notes_missing_menu() {
        let prompt = build_prompt(Mode::Nitro, "", ORDERS);
        assert!(prompt.contains(&format!("CURRENT ORDERS:\n{}", ORDERS)));
        assert!(prompt.contains("No menu provided"));
        assert!(!prompt.contains("AVAILABLE MENU"));
    }

    #[test]
    fn test_first_touch_uses_menu_only() {
        let prompt = build_prompt(Mode::FirstTouch, MENU, ORDERS);
        assert!(prompt.contains(&format!("AVAILABLE MENU:\n{}", MENU)));
        assert!(!prompt.contains("CURRENT ORDERS"));
        assert!(!prompt.contains("farid"));
        assert!(prompt.contains("FIRST order"));
    }

    #[test]
    fn test_all_modes_share_rules() {
        for mode in [Mode::Normal, Mode::Nitro, Mode::FirstTouch] {
            let prompt = build_prompt(mode, MENU, ORDERS);
            assert!(prompt.starts_with(INTRO), "mode {}", mode);
            assert!(prompt.contains("USER: miftah"), "mode {}", mode);
            assert!(prompt.contains(r#"ALWAYS USE: "nasi 1""#), "mode {}", mode);
            assert!(prompt.contains("Exactly 2-3 lauk"), "mode {}", mode);
            assert!(prompt.contains("At least 1 protein dish"), "mode {}", mode);
            assert!(prompt.contains("NEVER use square brackets"), "mode {}", mode);
            assert!(prompt.contains("Output ONLY the numbered order list"), "mode {}", mode);
        }
    }

    #[test]
    fn test_unknown_mode_builds_normal_prompt() {
        let request = GenerationRequest::new(Mode::from("express"))
            .with_menu(MENU)
            .with_current_orders(ORDERS);
        assert_eq!(
            build_order_prompt(&request),
            build_prompt(Mode::Normal, MENU, ORDERS)
        );
    }
}
