//! Integration tests for the two-pass assembler.

use sim6502::assembler::Segment;
use sim6502::{assemble, AssemblerError, WidthProfile};

fn p(width: u32) -> WidthProfile {
    WidthProfile::new(width).unwrap()
}

fn cells(source: &str, width: u32) -> Vec<u32> {
    let output = assemble(source, p(width)).unwrap();
    output.cells().map(|(_, cell)| cell).collect()
}

// ========== Basic Encoding ==========

#[test]
fn test_default_origin() {
    let output = assemble("LDA #$01\nSTA $0200", p(8)).unwrap();

    assert_eq!(output.origin, 0x0600);
    assert_eq!(output.length, 5);
    assert_eq!(
        output.segments,
        vec![Segment {
            start: 0x0600,
            cells: vec![0xA9, 0x01, 0x8D, 0x00, 0x02]
        }]
    );
    assert_eq!(output.sentinel, Some(0x0605));
}

#[test]
fn test_backward_branch_loop() {
    assert_eq!(cells("LOOP: INX\nBNE LOOP", 8), vec![0xE8, 0xD0, 0xFD]);
}

#[test]
fn test_forward_branch() {
    let source = "  BEQ done\n  INX\n  INY\ndone: BRK";
    assert_eq!(cells(source, 8), vec![0xF0, 0x02, 0xE8, 0xC8, 0x00]);
}

#[test]
fn test_mnemonics_are_case_insensitive() {
    assert_eq!(cells("lda #$01\nLdX #2", 8), vec![0xA9, 0x01, 0xA2, 0x02]);
}

#[test]
fn test_number_bases() {
    assert_eq!(
        cells("LDA #$10\nLDA #16\nLDA #%00010000", 8),
        vec![0xA9, 0x10, 0xA9, 0x10, 0xA9, 0x10]
    );
}

#[test]
fn test_comments_and_blank_lines() {
    let source = "; header\n\n  NOP ; trailing\n\t\n  BRK";
    assert_eq!(cells(source, 8), vec![0xEA, 0x00]);
}

#[test]
fn test_addressing_mode_selection() {
    let source = "\
LDA $10
LDA $10,X
LDX $10,Y
LDA $1234
LDA $1234,X
LDA $1234,Y
JMP ($1234)
LDA ($10,X)
LDA ($10),Y";
    assert_eq!(
        cells(source, 8),
        vec![
            0xA5, 0x10, //
            0xB5, 0x10, //
            0xB6, 0x10, //
            0xAD, 0x34, 0x12, //
            0xBD, 0x34, 0x12, //
            0xB9, 0x34, 0x12, //
            0x6C, 0x34, 0x12, //
            0xA1, 0x10, //
            0xB1, 0x10,
        ]
    );
}

#[test]
fn test_zero_page_y_falls_back_to_absolute() {
    // LDA has no zero page,Y form
    assert_eq!(cells("LDA $10,Y", 8), vec![0xB9, 0x10, 0x00]);
}

#[test]
fn test_accumulator_operand() {
    assert_eq!(cells("ASL A\nLSR\nrol a", 8), vec![0x0A, 0x4A, 0x2A]);
}

#[test]
fn test_labels_always_use_absolute_form() {
    let source = "*=$0010\nvar: DCB 0\n*=$0600\nLDA var";
    let output = assemble(source, p(8)).unwrap();
    assert_eq!(output.labels.address_of("var"), Some(0x10));
    assert_eq!(output.segments[1].cells, vec![0xAD, 0x10, 0x00]);
}

#[test]
fn test_label_low_and_high_bytes() {
    let source = "*=$1234\nstart: LDA #<start\nLDA #>start";
    assert_eq!(cells(source, 8), vec![0xA9, 0x34, 0xA9, 0x12]);
}

#[test]
fn test_label_on_its_own_line() {
    let output = assemble("NOP\nhere:\nNOP", p(8)).unwrap();
    assert_eq!(output.labels.address_of("here"), Some(0x0601));
}

#[test]
fn test_labels_are_case_sensitive() {
    let err = assemble("Loop: NOP\nJMP loop", p(8)).unwrap_err();
    assert!(matches!(err, AssemblerError::Assembly { line: 2, .. }));
}

// ========== Directives ==========

#[test]
fn test_dcb_values() {
    assert_eq!(cells("DCB $01,$02, 3 ,%100", 8), vec![1, 2, 3, 4]);
}

#[test]
fn test_dcb_value_out_of_range() {
    let err = assemble("DCB $100", p(8)).unwrap_err();
    assert_eq!(err.line(), Some(1));
    assert!(assemble("DCB $100", p(16)).is_ok());
}

#[test]
fn test_origin_splits_segments() {
    let output = assemble("*=$0700\nNOP\n*=$0800\nNOP\nNOP", p(8)).unwrap();
    assert_eq!(output.origin, 0x0700);
    assert_eq!(output.segments.len(), 2);
    assert_eq!(output.segments[1].start, 0x0800);
    assert_eq!(output.length, 3);
}

#[test]
fn test_adjacent_origins_merge() {
    let output = assemble("*=$0700\nNOP\n*=$0701\nNOP", p(8)).unwrap();
    assert_eq!(output.segments.len(), 1);
    assert_eq!(output.segments[0].cells, vec![0xEA, 0xEA]);
}

// ========== Errors ==========

#[test]
fn test_unknown_mnemonic() {
    let err = assemble("NOP\nFOO #$01", p(8)).unwrap_err();
    match err {
        AssemblerError::Assembly { line, text, .. } => {
            assert_eq!(line, 2);
            assert_eq!(text, "FOO #$01");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_invalid_mode_for_mnemonic() {
    // STX has no absolute,X form
    assert!(assemble("STX $1234,X", p(8)).is_err());
    // no immediate store
    assert!(assemble("STA #$01", p(8)).is_err());
}

#[test]
fn test_immediate_range_follows_width() {
    assert!(assemble("LDA #$100", p(8)).is_err());
    assert_eq!(cells("LDA #$100", 16), vec![0xA9, 0x0100]);
}

#[test]
fn test_label_conflict() {
    let err = assemble("start: NOP\nNOP\nstart: BRK", p(8)).unwrap_err();
    assert_eq!(
        err,
        AssemblerError::LabelConflict {
            line: 3,
            name: "start".to_string(),
            first_line: 1,
            text: "start: BRK".to_string(),
        }
    );
}

#[test]
fn test_undefined_label() {
    let err = assemble("BNE nowhere", p(8)).unwrap_err();
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn test_empty_program() {
    assert_eq!(
        assemble("  ; just a comment\n", p(8)).unwrap_err(),
        AssemblerError::EmptyProgram
    );
}

#[test]
fn test_branch_out_of_range_is_a_warning() {
    let source = format!("BEQ far\n{}far: BRK", "DCB 0,0,0,0\n".repeat(40));
    let output = assemble(&source, p(8)).unwrap();

    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].line, 1);
    assert!(output.warnings[0].to_string().starts_with("line 1:"));
}

// ========== Wide Profiles ==========

#[test]
fn test_sixteen_bit_encoding() {
    assert_eq!(
        cells("LDA #$1234\nLDA $1234\nJMP $00012345", 16),
        vec![0xA9, 0x1234, 0xA5, 0x1234, 0x4C, 0x2345, 0x0001]
    );
}

#[test]
fn test_thirty_two_bit_encoding() {
    assert_eq!(
        cells("LDA #$DEADBEEF\nJMP $12345678\nJSR $0600", 32),
        vec![0xA9, 0xDEAD_BEEF, 0x4C, 0x1234_5678, 0x20, 0x0600]
    );
}

#[test]
fn test_thirty_two_bit_label_is_one_cell() {
    let output = assemble("start: NOP\nJMP start", p(32)).unwrap();
    assert_eq!(output.length, 3);
    assert_eq!(output.segments[0].cells, vec![0xEA, 0x4C, 0x0600]);
}

#[test]
fn test_sixteen_bit_branch_offset() {
    assert_eq!(cells("LOOP: INX\nBNE LOOP", 16), vec![0xE8, 0xD0, 0xFFFD]);
}

// ========== Source Map ==========

#[test]
fn test_source_map_tracks_lines() {
    let output = assemble("; comment\nLDA #$01\n\nSTA $0200", p(8)).unwrap();

    let first = output.source_map.get_source_location(0x0600).unwrap();
    assert_eq!(first.line, 2);
    assert_eq!(first.length, 2);

    assert_eq!(output.source_map.find_containing(0x0603).unwrap().line, 4);
    assert!(output.source_map.find_containing(0x0605).is_none());

    let range = output.source_map.get_address_range(4).unwrap();
    assert_eq!((range.start, range.end), (0x0602, 0x0605));
}
