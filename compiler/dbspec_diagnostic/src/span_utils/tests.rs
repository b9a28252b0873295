use super::*;

#[test]
fn test_line_from_offset_multiple_lines() {
    let table = LineOffsetTable::build("line1\nline2\nline3");
    assert_eq!(table.line_from_offset(0), 1);
    assert_eq!(table.line_from_offset(5), 1); // '\n' after line1
    assert_eq!(table.line_from_offset(6), 2);
    assert_eq!(table.line_from_offset(12), 3);
}

#[test]
fn test_line_number_from_span() {
    let source = "line1\nline2\nline3";
    assert_eq!(line_number(source, Span::new(6, 11)), 2);
}

#[test]
fn test_lines_of_multiline_span() {
    let table = LineOffsetTable::build("a\nbb\nccc\n");
    assert_eq!(table.lines_of(Span::new(2, 8)), (2, 3));
    // Ending right after a newline stays on the previous line.
    assert_eq!(table.lines_of(Span::new(2, 5)), (2, 2));
    assert_eq!(table.lines_of(Span::point(5)), (3, 3));
}

#[test]
fn test_line_text_strips_terminators() {
    let source = "first\r\nsecond\nlast";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.line_text(source, 1), Some("first"));
    assert_eq!(table.line_text(source, 2), Some("second"));
    assert_eq!(table.line_text(source, 3), Some("last"));
    assert_eq!(table.line_text(source, 0), None);
    assert_eq!(table.line_text(source, 4), None);
    assert_eq!(table.line_count(), 3);
}
