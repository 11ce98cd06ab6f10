use super::*;

#[test]
fn test_error_counts_and_flag() {
    let mut eb = ErrorBuffer::new();
    assert!(!eb.error_msg("first"));
    assert!(eb.is_error);
    assert_eq!(eb.nr_errors, 1);
    assert_eq!(eb.msg, "first");

    eb.error_msg("second");
    assert_eq!(eb.nr_errors, 2);
    assert_eq!(eb.msg, "second");
}

#[test]
fn test_info_does_not_count() {
    let mut eb = ErrorBuffer::new();
    eb.info_msg("saved");
    assert!(!eb.is_error);
    assert_eq!(eb.nr_errors, 0);
    assert_eq!(eb.msg, "saved");
}

#[test]
fn test_config_prefix() {
    let mut eb = ErrorBuffer::new();
    eb.config_file = Some(("rc".to_string(), 12));
    eb.command = Some("set".to_string());
    eb.error_msg("no such option");
    assert_eq!(eb.msg, "rc:12: set: no such option");
}

#[test]
fn test_report_editor_error() {
    let mut eb = ErrorBuffer::new();
    let err = EditorError::new(ErrorKind::Io, "permission denied");
    assert!(!eb.report(&err));
    assert_eq!(eb.msg, "permission denied");
    assert_eq!(eb.nr_errors, 1);
}

#[test]
fn test_clear() {
    let mut eb = ErrorBuffer::new();
    eb.error_msg("oops");
    eb.clear_msg();
    assert!(eb.msg.is_empty());
    assert!(!eb.is_error);
    // The error count is not reset by clearing the message
    assert_eq!(eb.nr_errors, 1);
}
