use super::*;
use pretty_assertions::assert_eq;

#[test]
fn buffer_captures_lines() {
    let handler = buffer_handler();
    handler.println("first");
    handler.println("second");
    assert_eq!(handler.get_output(), "first\nsecond\n");
    handler.clear();
    assert_eq!(handler.get_output(), "");
}

#[test]
fn silent_and_stdout_capture_nothing() {
    let silent = silent_handler();
    silent.println("dropped");
    assert_eq!(silent.get_output(), "");
    assert_eq!(stdout_handler().get_output(), "");
}
