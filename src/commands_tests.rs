use super::*;
use crate::editor::{Editor, EditorStatus};

fn editor() -> Editor {
    Editor::with_defaults()
}

fn text(e: &Editor) -> Vec<u8> {
    e.current_buffer().blocks.to_bytes()
}

#[test]
fn test_command_tables_sorted() {
    NORMAL_COMMANDS.assert_sorted();
    COMMAND_MODE_COMMANDS.assert_sorted();
    SEARCH_MODE_COMMANDS.assert_sorted();
    CMDLINE_COMMANDS.assert_sorted();
}

#[test]
fn test_builtin_configs_load_cleanly() {
    let e = editor();
    assert_eq!(e.err.nr_errors, 0, "builtin configs must not error: {}", e.err.msg);
    assert!(e.syntaxes.find("c").is_some());
    assert!(e.syntaxes.find("sh").is_some());
    assert!(e.syntaxes.find(".sh-heredoc").is_some());
    assert_eq!(e.aliases.find("q"), Some("quit"));
}

#[test]
fn test_insert_command_and_undo() {
    let mut e = editor();
    e.handle_command("insert -m hello", false);
    assert_eq!(text(&e), b"hello");
    assert_eq!(
        e.current_view().cursor.get_offset(&e.current_buffer().blocks),
        5
    );
    e.handle_command("undo", false);
    assert_eq!(text(&e), b"");
}

#[test]
fn test_expand_tab_scenario() {
    // set expand-tab true; set indent-width 4; insert "\t" -> 4 spaces
    let mut e = editor();
    e.handle_command("set expand-tab true; set indent-width 4; insert \"\\t\"", false);
    assert_eq!(e.err.nr_errors, 0, "{}", e.err.msg);
    assert_eq!(text(&e), b"    ");
}

#[test]
fn test_open_insert_save_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.c");
    let mut e = editor();
    e.handle_command(
        &format!("open {}; insert -m \"int x;\\n\"; save", path.display()),
        false,
    );
    assert_eq!(e.err.nr_errors, 0, "{}", e.err.msg);
    assert_eq!(std::fs::read(&path).unwrap(), b"int x;\n");
    assert!(!e.current_buffer().modified());
}

#[test]
fn test_alias_expansion_with_args() {
    // alias q quit; q -f exits with status 0
    let mut e = editor();
    e.handle_command("insert x", false); // modified buffer would block quit
    e.handle_command("q -f", false);
    assert_eq!(e.status, EditorStatus::Quit(0));
}

#[test]
fn test_quit_blocked_by_modified_buffer() {
    let mut e = editor();
    e.handle_command("insert x", false);
    e.handle_command("quit", false);
    assert_eq!(e.status, EditorStatus::Running);
    assert!(e.err.is_error);
}

#[test]
fn test_quit_exit_code() {
    let mut e = editor();
    e.handle_command("quit 7", false);
    assert_eq!(e.status, EditorStatus::Quit(7));
}

#[test]
fn test_alias_self_recursion_terminates() {
    let mut e = editor();
    e.handle_command("alias selfref selfref", false);
    e.handle_command("selfref", false);
    assert!(e.err.is_error);
    assert!(e.err.msg.contains("recursion"), "{}", e.err.msg);
}

#[test]
fn test_alias_cycle_terminates() {
    let mut e = editor();
    e.handle_command("alias ping pong", false);
    e.handle_command("alias pong ping", false);
    e.handle_command("ping", false);
    assert!(e.err.msg.contains("recursion"), "{}", e.err.msg);
}

#[test]
fn test_unknown_command_reports() {
    let mut e = editor();
    e.handle_command("no-such-thing", false);
    assert!(e.err.msg.contains("No such command or alias"), "{}", e.err.msg);
}

#[test]
fn test_set_unknown_option() {
    let mut e = editor();
    e.handle_command("set no-such-option 1", false);
    assert!(e.err.is_error);
}

#[test]
fn test_motion_commands() {
    let mut e = editor();
    e.handle_command("insert -m \"one\\ntwo\\nthree\\n\"", false);
    e.handle_command("bof", false);
    e.handle_command("down; down; eol", false);
    let offset = e.current_view().cursor.get_offset(&e.current_buffer().blocks);
    assert_eq!(offset, 13); // end of "three"
    e.handle_command("line 1", false);
    assert_eq!(e.current_view().cursor.get_offset(&e.current_buffer().blocks), 0);
    e.handle_command("word-fwd", false);
    assert_eq!(e.current_view().cursor.get_offset(&e.current_buffer().blocks), 4);
}

#[test]
fn test_select_delete() {
    let mut e = editor();
    e.handle_command("insert \"ab cd ef\"", false);
    e.handle_command("bof; select; word-fwd; delete", false);
    assert_eq!(text(&e), b"cd ef");
}

#[test]
fn test_replace_command() {
    let mut e = editor();
    e.handle_command("insert \"aaa bbb aaa\\n\"", false);
    e.handle_command("replace -g aaa xyz", false);
    assert_eq!(text(&e), b"xyz bbb xyz\n");
    e.handle_command("undo", false);
    assert_eq!(text(&e), b"aaa bbb aaa\n");
}

#[test]
fn test_search_command_moves_cursor() {
    let mut e = editor();
    e.handle_command("insert -m \"alpha\\nbeta\\n\"", false);
    e.handle_command("bof; search beta", false);
    assert_eq!(e.current_view().cursor.get_offset(&e.current_buffer().blocks), 6);
}

#[test]
fn test_search_word_under_cursor() {
    let mut e = editor();
    e.handle_command("insert -m \"needle hay needle\\n\"", false);
    e.handle_command("bof", false);
    e.handle_command("search -w", false);
    assert_eq!(
        e.current_view().cursor.get_offset(&e.current_buffer().blocks),
        11
    );
}

#[test]
fn test_macro_record_and_play() {
    let mut e = editor();
    e.handle_command("macro record", false);
    e.handle_command("insert -m \"ab\\n\"", true);
    e.handle_command("macro stop", false);
    assert_eq!(text(&e), b"ab\n");

    e.handle_command("macro play", false);
    assert_eq!(text(&e), b"ab\nab\n");
    e.handle_command("macro play", false);
    assert_eq!(text(&e), b"ab\nab\nab\n");
}

#[test]
fn test_macro_replay_aborts_on_error() {
    let mut e = editor();
    e.handle_command("macro record", false);
    e.handle_command("insert -m x", true);
    // Commands are recorded before they run, so a failing one still
    // lands in the macro
    e.handle_command("include /nonexistent-vellum-config", true);
    e.handle_command("insert -m y", true);
    e.handle_command("macro stop", false);
    assert_eq!(text(&e), b"xy");

    // Replay: the failing include aborts before the second insert
    let mut e2 = editor();
    e2.macro_rec = e.macro_rec.clone();
    e2.handle_command("macro play", false);
    assert_eq!(text(&e2), b"x");
}

#[test]
fn test_show_alias_round_trip() {
    let mut e = editor();
    e.handle_command("alias zz 'save; quit'", false);
    e.handle_command("show alias", false);
    let dump = String::from_utf8(text(&e)).unwrap();
    assert!(dump.contains("alias zz"));

    // Feeding the dump back yields identical state
    let mut e2 = Editor::new();
    crate::config::exec_config(&mut e2, "dump", &dump);
    assert_eq!(e2.err.nr_errors, 0, "{}", e2.err.msg);
    assert_eq!(e2.aliases.dump(), e.aliases.dump());
}

#[test]
fn test_show_set_round_trip() {
    let mut e = editor();
    e.handle_command("set indent-width 3; set expand-tab true", false);
    e.handle_command("show set", false);
    let dump = String::from_utf8(text(&e)).unwrap();

    let mut e2 = Editor::new();
    crate::config::exec_config(&mut e2, "dump", &dump);
    assert_eq!(e2.err.nr_errors, 0, "{}", e2.err.msg);
    assert_eq!(e2.current_buffer().options.indent_width, 3);
    assert!(e2.current_buffer().options.expand_tab);
    assert_eq!(
        e2.options.case_sensitive_search,
        e.options.case_sensitive_search
    );
}

#[test]
fn test_show_bind_round_trip() {
    let mut e = editor();
    e.handle_command("bind C-s save", false);
    e.handle_command("show bind", false);
    let dump = String::from_utf8(text(&e)).unwrap();
    assert!(dump.contains("bind C-s save"));

    let mut e2 = Editor::with_defaults();
    crate::config::exec_config(&mut e2, "dump", &dump);
    assert_eq!(e2.err.nr_errors, 0, "{}", e2.err.msg);
    // Dumping again produces the same text
    e2.handle_command("show bind", false);
    let dump2 = String::from_utf8(e2.current_buffer().blocks.to_bytes()).unwrap();
    assert_eq!(dump, dump2);
}

#[test]
fn test_show_errorfmt_round_trip() {
    let e = editor();
    let dump = e.compilers.dump();
    assert!(dump.contains("errorfmt"));
    let mut e2 = Editor::new();
    crate::config::exec_config(&mut e2, "dump", &dump);
    assert_eq!(e2.err.nr_errors, 0, "{}", e2.err.msg);
    assert_eq!(e2.compilers.dump(), dump);
}

#[test]
fn test_include_builtin() {
    let mut e = Editor::new();
    e.handle_command("include -b syntax/c", false);
    assert_eq!(e.err.nr_errors, 0, "{}", e.err.msg);
    assert!(e.syntaxes.find("c").is_some());

    e.handle_command("include -b nope/missing", false);
    assert!(e.err.is_error);
}

#[test]
fn test_bind_and_unbind() {
    let mut e = editor();
    e.handle_command("bind F9 'insert -m Z'", false);
    let mode = &e.modes["normal"];
    let key = crate::bind::parse_key("F9").unwrap();
    assert!(mode.bindings.lookup(key).is_some());

    e.handle_command("unbind F9", false);
    assert!(e.modes["normal"].bindings.lookup(key).is_none());

    e.handle_command("bind not-a-key save", false);
    assert!(e.err.is_error);
}

#[test]
fn test_copy_paste_commands() {
    let mut e = editor();
    e.handle_command("insert -m \"first\\nsecond\\n\"", false);
    e.handle_command("bof; copy; paste", false);
    assert_eq!(text(&e), b"first\nfirst\nsecond\n");
}

#[test]
fn test_shift_command() {
    let mut e = editor();
    e.handle_command("insert \"line\\n\"", false);
    e.handle_command("shift 1", false);
    assert_eq!(text(&e), b"\tline\n");
    e.handle_command("shift -1", false);
    assert_eq!(text(&e), b"line\n");
    e.handle_command("shift 0", false);
    assert!(e.err.is_error);
}

#[test]
fn test_case_command() {
    let mut e = editor();
    e.handle_command("insert \"word\\n\"", false);
    e.handle_command("bof; select -l; case -u", false);
    assert_eq!(text(&e), b"WORD\n");
}

#[test]
fn test_save_crlf_flag_conflict() {
    let mut e = editor();
    e.handle_command("save -d -u somewhere", false);
    assert!(e.err.is_error);
    assert!(e.err.msg.contains("together"), "{}", e.err.msg);
}

#[test]
fn test_save_without_filename() {
    let mut e = editor();
    e.handle_command("save", false);
    assert!(e.err.msg.contains("No filename"));
}

#[test]
fn test_c_syntax_todo_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.c");
    std::fs::write(&path, b"/* TODO: fix */\n").unwrap();

    let mut e = editor();
    assert!(e.open_file(&path));
    assert_eq!(e.current_buffer().syntax_name.as_deref(), Some("c"));

    let styles = e.highlight_lines(0, 0);
    let notice = crate::syntax::highlight::STYLE_NOTICE;
    let line = &styles[0];
    for (i, &s) in line.iter().enumerate() {
        if (3..7).contains(&i) {
            assert_eq!(s, notice, "byte {i} should be notice-styled");
        } else {
            assert_ne!(s, notice, "byte {i} should not be notice-styled");
        }
    }
}

#[test]
fn test_sh_heredoc_highlight_through_editor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.sh");
    std::fs::write(&path, b"cat <<EOF\nhello\nEOF\necho done\n").unwrap();

    let mut e = editor();
    assert!(e.open_file(&path));
    assert_eq!(e.current_buffer().syntax_name.as_deref(), Some("sh"));

    let styles = e.highlight_lines(0, 3);
    let heredoc = e.syntaxes.lookup_emit("heredoc").unwrap();
    // The body line is heredoc-styled; the line after the delimiter
    // is back to normal
    assert!(styles[1].iter().all(|&s| s == heredoc));
    assert!(styles[3].iter().all(|&s| s != heredoc));
}

#[test]
fn test_compile_and_show_errors() {
    let mut e = editor();
    e.handle_command(
        "compile gcc sh -c 'echo \"f.c:3:7: error: bad\" >&2; exit 1'",
        false,
    );
    assert_eq!(e.messages.len(), 1);
    assert_eq!(e.messages[0].file.as_deref(), Some("f.c"));
    assert_eq!(e.messages[0].line, Some(3));
    assert_eq!(e.messages[0].column, Some(7));
    assert_eq!(e.messages[0].text, "bad");

    e.handle_command("show errors", false);
    let dump = String::from_utf8(text(&e)).unwrap();
    assert_eq!(dump, "f.c:3: bad\n");
}

#[test]
fn test_errorfmt_command_registers_parser() {
    let mut e = Editor::new();
    e.handle_command(
        "errorfmt mk '^(.+?)\\|([0-9]+)\\| (.+)$' file line message",
        false,
    );
    assert_eq!(e.err.nr_errors, 0, "{}", e.err.msg);
    let m = e
        .compilers
        .find("mk")
        .unwrap()
        .parse_line("a.c|12| broken")
        .unwrap();
    assert_eq!(m.file.as_deref(), Some("a.c"));
    assert_eq!(m.line, Some(12));
    assert_eq!(m.text, "broken");
}

#[test]
fn test_replace_confirm_scripted() {
    use crate::search::ConfirmAnswer;
    let mut e = editor();
    e.handle_command("insert \"x x x\\n\"", false);
    e.pending_confirm_answers = vec![
        ConfirmAnswer::Yes,
        ConfirmAnswer::No,
        ConfirmAnswer::Yes,
    ];
    e.handle_command("replace -cg x Y", false);
    assert_eq!(text(&e), b"Y x Y\n");
}

#[test]
fn test_new_line_command() {
    let mut e = editor();
    e.handle_command("insert \"abc\\n\"", false);
    e.handle_command("bof; right; new-line; insert -m X", false);
    assert_eq!(text(&e), b"abc\nX\n");
}

#[test]
fn test_join_command() {
    let mut e = editor();
    e.handle_command("insert \"a\\nb\\n\"", false);
    e.handle_command("bof; join", false);
    assert_eq!(text(&e), b"a b\n");
}

#[test]
fn test_bookmark_command() {
    let mut e = editor();
    e.handle_command("insert -m \"one\\ntwo\\nthree\\n\"", false);
    e.handle_command("line 3; bookmark; bof", false);
    assert_eq!(e.current_view().cursor.get_offset(&e.current_buffer().blocks), 0);
    e.handle_command("bookmark -p", false);
    assert_eq!(e.current_view().cursor.get_offset(&e.current_buffer().blocks), 8);
}
