//! Property-based tests for the assembler.
//!
//! These tests verify assembler invariants like:
//! - Number format equivalence (hex, decimal, binary produce same cells)
//! - Zero page versus absolute selection by operand value
//! - No panics on malformed input
//! - Label addresses and DCB data

use proptest::prelude::*;
use sim6502::{assemble, WidthProfile};

fn p(width: u32) -> WidthProfile {
    WidthProfile::new(width).unwrap()
}

fn any_width() -> impl Strategy<Value = u32> {
    prop_oneof![Just(8u32), Just(16u32), Just(32u32)]
}

fn cells(source: &str, width: u32) -> Vec<u32> {
    assemble(source, p(width))
        .unwrap()
        .cells()
        .map(|(_, cell)| cell)
        .collect()
}

// ========== Number Formats ==========

proptest! {
    /// Decimal, hex and binary immediates assemble to the same cells
    #[test]
    fn prop_number_formats_equivalent(width in any_width(), raw in any::<u32>()) {
        let value = raw & p(width).data_mask();

        let hex = cells(&format!("LDA #${:X}", value), width);
        let dec = cells(&format!("LDA #{}", value), width);
        let bin = cells(&format!("LDA #%{:b}", value), width);

        prop_assert_eq!(&hex, &vec![0xA9, value]);
        prop_assert_eq!(&hex, &dec);
        prop_assert_eq!(&hex, &bin);
    }

    /// Immediates above the data mask are rejected
    #[test]
    fn prop_immediate_above_mask_rejected(width in prop_oneof![Just(8u32), Just(16u32)], raw in any::<u32>()) {
        let dm = p(width).data_mask();
        let value = dm as u64 + 1 + (raw as u64 % 0x1_0000);

        let source = format!("LDA #${:X}", value);
        prop_assert!(assemble(&source, p(width)).is_err());
    }

    /// Operands within the data mask pick zero page, larger ones absolute
    #[test]
    fn prop_zero_page_selection(width in prop_oneof![Just(8u32), Just(16u32)], raw in any::<u32>()) {
        let profile = p(width);
        let operand = raw & profile.address_mask();
        let encoded = cells(&format!("LDA ${:X}", operand), width);

        if operand <= profile.data_mask() {
            prop_assert_eq!(encoded, vec![0xA5, operand]);
        } else {
            prop_assert_eq!(encoded[0], 0xAD);
            prop_assert_eq!(encoded.len(), 3);
            let address = encoded[1] | (encoded[2] << profile.data_width());
            prop_assert_eq!(address, operand);
        }
    }
}

// ========== Robustness ==========

proptest! {
    /// Arbitrary text never panics the assembler
    #[test]
    fn prop_arbitrary_text_never_panics(width in any_width(), source in "[ -~\t\n]{0,200}") {
        let _ = assemble(&source, p(width));
    }

    /// Plausible but broken lines never panic either
    #[test]
    fn prop_instruction_like_lines_never_panic(
        width in any_width(),
        lines in prop::collection::vec(
            "[A-Za-z]{0,4}:? ?(LDA|STA|JMP|BNE|DCB|\\*=)? ?[#($%]{0,2}[0-9A-Fa-f]{0,9}[,)]{0,2}[XYxy]?\\)?",
            1..20,
        ),
    ) {
        let _ = assemble(&lines.join("\n"), p(width));
    }
}

// ========== Labels and Data ==========

proptest! {
    /// A label after n NOPs sits n cells past the origin
    #[test]
    fn prop_label_after_nops(width in any_width(), count in 0usize..64) {
        let source = format!("{}target: BRK", "NOP\n".repeat(count));
        let output = assemble(&source, p(width)).unwrap();

        prop_assert_eq!(output.labels.address_of("target"), Some(0x0600 + count as u32));
        prop_assert_eq!(output.length, count as u32 + 1);
    }

    /// DCB emits its values in order
    #[test]
    fn prop_dcb_values(width in any_width(), values in prop::collection::vec(any::<u32>(), 1..16)) {
        let dm = p(width).data_mask();
        let values: Vec<u32> = values.into_iter().map(|v| v & dm).collect();
        let list: Vec<String> = values.iter().map(|v| format!("${:X}", v)).collect();

        prop_assert_eq!(cells(&format!("DCB {}", list.join(",")), width), values);
    }

    /// A backward branch over n NOPs encodes -(n + 2)
    #[test]
    fn prop_backward_branch_offset(width in any_width(), count in 0usize..100) {
        let source = format!("top: {}BNE top", "NOP\n".repeat(count));
        let encoded = cells(&source, width);
        let dm = p(width).data_mask();

        let offset = encoded[encoded.len() - 1];
        prop_assert_eq!(offset, (count as u32 + 2).wrapping_neg() & dm);
    }
}
