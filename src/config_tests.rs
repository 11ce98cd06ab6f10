use super::*;
use crate::editor::Editor;

#[test]
fn test_comments_and_blank_lines_skipped() {
    let mut e = Editor::new();
    exec_config(
        &mut e,
        "test",
        "# a comment\n\n   # indented comment\nset indent-width 4\n",
    );
    assert_eq!(e.err.nr_errors, 0, "{}", e.err.msg);
    assert_eq!(e.current_buffer().options.indent_width, 4);
}

#[test]
fn test_error_carries_file_and_line_prefix() {
    let mut e = Editor::new();
    exec_config(&mut e, "myrc", "set indent-width 4\nbogus-command arg\n");
    assert_eq!(e.err.nr_errors, 1);
    assert!(e.err.msg.starts_with("myrc:2: "), "{}", e.err.msg);
    // Execution continued despite the error
    assert_eq!(e.current_buffer().options.indent_width, 4);
    // The prefix does not leak past the config run
    e.err.error_msg("after");
    assert_eq!(e.err.msg, "after");
}

#[test]
fn test_parse_error_in_config() {
    let mut e = Editor::new();
    exec_config(&mut e, "rc", "insert 'unclosed\n");
    assert_eq!(e.err.nr_errors, 1);
    assert!(e.err.msg.contains("rc:1:"), "{}", e.err.msg);
    assert!(e.err.msg.contains("unclosed"), "{}", e.err.msg);
}

#[test]
fn test_builtin_lookup() {
    assert!(find_builtin("rc").is_some());
    assert!(find_builtin("syntax/c").is_some());
    assert!(find_builtin("syntax/sh").is_some());
    assert!(find_builtin("compiler/gcc").is_some());
    assert!(find_builtin("syntax/cobol").is_none());
}

#[test]
fn test_open_syntax_finalized_at_config_end() {
    let mut e = Editor::new();
    exec_config(
        &mut e,
        "syn",
        "syntax tiny\nstate start default\n eat this\n",
    );
    assert_eq!(e.err.nr_errors, 0, "{}", e.err.msg);
    assert!(e.syntax_loader.is_none());
    assert!(e.syntaxes.find("tiny").is_some());
}

#[test]
fn test_broken_syntax_definition_reports() {
    let mut e = Editor::new();
    exec_config(
        &mut e,
        "syn",
        "syntax broken\nstate start default\n char x missing-state\n eat this\n",
    );
    assert!(e.err.nr_errors > 0);
    assert!(e.syntaxes.find("broken").is_none());
}

#[test]
fn test_syntax_commands_outside_definition_error() {
    let mut e = Editor::new();
    exec_config(&mut e, "syn", "state orphan\n");
    assert_eq!(e.err.nr_errors, 1);
    assert!(e.err.msg.contains("No syntax"), "{}", e.err.msg);
}

#[test]
fn test_user_syntax_usable_after_config() {
    let mut e = Editor::new();
    exec_config(
        &mut e,
        "syn",
        concat!(
            "syntax shouty\n",
            "state start default\n",
            " char -b A-Z caps\n",
            " eat this\n",
            "state caps loud\n",
            " char -b A-Z this\n",
            " noeat start\n",
        ),
    );
    assert_eq!(e.err.nr_errors, 0, "{}", e.err.msg);

    let (_, buffer) = e.current();
    buffer.begin_change(crate::change::MergeKind::None);
    buffer.insert_bytes(0, b"ab CD ef\n");
    buffer.end_change();
    buffer.options.filetype = "shouty".to_string();
    e.sync_syntax();

    let styles = e.highlight_lines(0, 0);
    let loud = e.syntaxes.lookup_emit("loud").unwrap();
    assert_eq!(styles[0][3], loud);
    assert_eq!(styles[0][4], loud);
    assert_ne!(styles[0][0], loud);
}
