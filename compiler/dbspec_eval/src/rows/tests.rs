use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn cells(values: &[&str]) -> Row {
    values.iter().map(|cell| Some((*cell).to_owned())).collect()
}

fn drain(rows: &RowsHandle) -> Vec<Row> {
    let Ok(mut traversal) = rows.traverse() else {
        panic!("rows are locked");
    };
    let mut out = Vec::new();
    while let Ok(Some(row)) = traversal.next_row() {
        out.push(row);
    }
    out
}

fn live(rows: Vec<Row>) -> Rows {
    let columns = rows.first().map_or(0, Vec::len);
    Rows::live(Box::new(VecCursor::new(columns, rows)))
}

#[test]
fn table_from_text() {
    let rows = RowsHandle::new(Rows::from_text("a\tb\nc\td\n"));
    assert_eq!(rows.column_count(), 2);
    assert_eq!(drain(&rows), vec![cells(&["a", "b"]), cells(&["c", "d"])]);
}

#[test]
fn ragged_table_lines_are_padded_with_nulls() {
    let table = RowsHandle::new(Rows::from_text("a\tb\nc"));
    assert_eq!(table.column_count(), 2);
    let padded = vec![cells(&["a", "b"]), vec![Some("c".to_owned()), None]];
    assert_eq!(drain(&table), padded);

    let query = RowsHandle::new(live(padded));
    assert_eq!(rows_equal(&table, &query), Ok(true));
}

#[test]
fn empty_text_has_no_rows() {
    let rows = RowsHandle::new(Rows::from_text(""));
    assert_eq!(rows.size(), Ok(0));
    assert_eq!(drain(&rows), Vec::<Row>::new());
}

#[test]
fn trailing_newline_adds_no_row() {
    assert_eq!(RowsHandle::new(Rows::from_text("x\n")).size(), Ok(1));
    assert_eq!(RowsHandle::new(Rows::from_text("x\n\n")).size(), Ok(2));
}

#[test]
fn lock_is_exclusive_until_freed() {
    let mut rows = Rows::from_text("a\nb");
    assert_eq!(rows.try_lock_and_rewind(), Ok(true));
    assert_eq!(rows.next_row(), Ok(Some(cells(&["a"]))));
    assert_eq!(rows.next_row(), Ok(Some(cells(&["b"]))));
    assert_eq!(rows.next_row(), Ok(None));
    assert_eq!(rows.next_row(), Ok(None));
    assert_eq!(rows.try_lock_and_rewind(), Ok(false));
    rows.free();
    rows.free();
    assert_eq!(rows.try_lock_and_rewind(), Ok(true));
    assert_eq!(rows.next_row(), Ok(Some(cells(&["a"]))));
}

#[test]
fn traversal_guard_frees_on_drop() {
    let rows = RowsHandle::new(Rows::from_text("a"));
    {
        let _first = rows.traverse();
        assert!(rows.is_locked());
        assert_eq!(rows.traverse().err(), Some(RowsError::Locked));
    }
    assert!(!rows.is_locked());
    assert!(rows.traverse().is_ok());
}

#[test]
fn live_rows_rewind_on_lock() {
    let rows = RowsHandle::new(live(vec![cells(&["1"]), cells(&["2"])]));
    assert_eq!(drain(&rows), vec![cells(&["1"]), cells(&["2"])]);
    assert_eq!(drain(&rows), vec![cells(&["1"]), cells(&["2"])]);
}

#[test]
fn live_size_restores_position() {
    let mut rows = live(vec![cells(&["1"]), cells(&["2"]), cells(&["3"])]);
    assert_eq!(rows.try_lock_and_rewind(), Ok(true));
    assert_eq!(rows.next_row(), Ok(Some(cells(&["1"]))));
    assert_eq!(rows.size(), Ok(3));
    assert_eq!(rows.next_row(), Ok(Some(cells(&["2"]))));
}

#[test]
fn live_size_before_first_row() {
    let mut rows = live(vec![cells(&["1"])]);
    assert_eq!(rows.size(), Ok(1));
    assert_eq!(rows.try_lock_and_rewind(), Ok(true));
    assert_eq!(rows.next_row(), Ok(Some(cells(&["1"]))));
    assert_eq!(live(Vec::new()).size(), Ok(0));
}

#[test]
fn live_null_cells() {
    let rows = RowsHandle::new(Rows::live(Box::new(VecCursor::new(
        2,
        vec![vec![Some("x".to_owned()), None]],
    ))));
    assert_eq!(drain(&rows), vec![vec![Some("x".to_owned()), None]]);
}

#[test]
fn equal_tables() {
    let a = RowsHandle::new(Rows::from_text("a\tb\nc\td"));
    let b = RowsHandle::new(Rows::from_text("a\tb\nc\td\n"));
    assert_eq!(rows_equal(&a, &b), Ok(true));
    assert!(!a.is_locked());
    assert!(!b.is_locked());
}

#[test]
fn removing_a_row_makes_tables_unequal() {
    let a = RowsHandle::new(Rows::from_text("a\tb\nc\td"));
    let b = RowsHandle::new(Rows::from_text("a\tb"));
    assert_eq!(rows_equal(&a, &b), Ok(false));
    assert_eq!(rows_equal(&b, &a), Ok(false));
}

#[test]
fn differing_cells_are_unequal() {
    let a = RowsHandle::new(Rows::from_text("a\tb"));
    let b = RowsHandle::new(Rows::from_text("a\tc"));
    let c = RowsHandle::new(Rows::from_text("a"));
    assert_eq!(rows_equal(&a, &b), Ok(false));
    assert_eq!(rows_equal(&a, &c), Ok(false));
}

#[test]
fn table_equals_live_rows_with_same_content() {
    let table = RowsHandle::new(Rows::from_text("1\tx"));
    let query = RowsHandle::new(live(vec![cells(&["1", "x"])]));
    assert_eq!(rows_equal(&table, &query), Ok(true));
}

#[test]
fn self_comparison_skips_traversal() {
    let rows = RowsHandle::new(Rows::from_text("a"));
    let _busy = rows.traverse();
    assert_eq!(rows_equal(&rows, &rows.clone()), Ok(true));
}

#[test]
fn comparing_locked_rows_fails() {
    let a = RowsHandle::new(Rows::from_text("a"));
    let b = RowsHandle::new(Rows::from_text("a"));
    let busy = b.traverse();
    assert_eq!(rows_equal(&a, &b), Err(RowsError::Locked));
    assert!(!a.is_locked());
    drop(busy);
    assert_eq!(rows_equal(&a, &b), Ok(true));
}

#[test]
fn cursor_positions() {
    let mut cursor = VecCursor::new(1, vec![cells(&["a"]), cells(&["b"])]);
    assert_eq!(cursor.row(), Ok(0));
    assert!(cursor.get(0).is_err());
    assert_eq!(cursor.last(), Ok(true));
    assert_eq!(cursor.row(), Ok(2));
    assert_eq!(cursor.advance(), Ok(false));
    assert_eq!(cursor.row(), Ok(0));
    assert_eq!(cursor.absolute(1), Ok(true));
    assert_eq!(cursor.get(0), Ok(Some("a".to_owned())));
    assert!(cursor.get(1).is_err());
}

proptest! {
    #[test]
    fn table_rows_match_lines(lines in prop::collection::vec("[a-z\t]{0,8}", 0..6)) {
        let text = lines.join("\n");
        let rows = RowsHandle::new(Rows::from_text(&text));
        let mut expected: Vec<Row> = text
            .lines()
            .map(|line| line.split('\t').map(|cell| Some(cell.to_owned())).collect())
            .collect();
        let columns = expected.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut expected {
            row.resize(columns, None);
        }
        prop_assert_eq!(rows.column_count(), columns);
        prop_assert_eq!(rows.size(), Ok(expected.len()));
        prop_assert_eq!(drain(&rows), expected);
    }

    #[test]
    fn tables_equal_themselves_structurally(text in "[a-c\t\n]{0,16}") {
        let a = RowsHandle::new(Rows::from_text(&text));
        let b = RowsHandle::new(Rows::from_text(&text));
        prop_assert_eq!(rows_equal(&a, &b), Ok(true));
    }
}
