use super::*;
use pretty_assertions::assert_eq;

#[test]
fn point_is_empty() {
    assert_eq!(Span::point(7).to_range(), 7..7);
}

#[test]
fn from_range() {
    assert_eq!(Span::try_from_range(50..100), Ok(Span::new(50, 100)));
}

#[test]
#[cfg(target_pointer_width = "64")]
fn from_range_overflow() {
    let too_big = u32::MAX as usize + 1;
    assert_eq!(
        Span::try_from_range(too_big..too_big + 1),
        Err(SpanError(too_big))
    );
    assert_eq!(Span::try_from_range(0..too_big), Err(SpanError(too_big)));
}

#[test]
fn slice() {
    let source = "Log x\n";
    assert_eq!(Span::new(4, 5).slice(source), "x");
    assert_eq!(Span::new(4, 50).slice(source), "");
}

#[test]
fn display() {
    assert_eq!(Span::new(3, 9).to_string(), "3..9");
    assert_eq!(format!("{:?}", Span::new(3, 9)), "3..9");
}
