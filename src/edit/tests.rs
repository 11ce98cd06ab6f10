use super::*;

fn setup(text: &str) -> (View, Buffer) {
    (View::new(0), Buffer::from_bytes(text.as_bytes()))
}

fn cursor(v: &View, b: &Buffer) -> usize {
    v.cursor.get_offset(&b.blocks)
}

#[test]
fn test_insert_ch_and_merge() {
    let (mut v, mut b) = setup("");
    for ch in "abc".chars() {
        insert_ch(&mut v, &mut b, ch);
        b.end_change();
    }
    assert_eq!(b.blocks.to_bytes(), b"abc");
    assert_eq!(cursor(&v, &b), 3);

    // The whole typed run is one undo step
    b.undo().unwrap();
    assert_eq!(b.blocks.to_bytes(), b"");
}

#[test]
fn test_auto_indent_on_newline() {
    let (mut v, mut b) = setup("    body\n");
    v.cursor.goto_offset(&b.blocks, 8); // end of "    body"
    insert_ch(&mut v, &mut b, '\n');
    assert_eq!(b.blocks.to_bytes(), b"    body\n    \n");
    assert_eq!(cursor(&v, &b), 13);
}

#[test]
fn test_no_auto_indent_when_disabled() {
    let (mut v, mut b) = setup("    body\n");
    b.options.auto_indent = false;
    v.cursor.goto_offset(&b.blocks, 8);
    insert_ch(&mut v, &mut b, '\n');
    assert_eq!(b.blocks.to_bytes(), b"    body\n\n");
}

#[test]
fn test_expand_tab_insertion() {
    let (mut v, mut b) = setup("");
    b.options.expand_tab = true;
    b.options.indent_width = 4;
    insert_text_with_options(&mut v, &mut b, b"\t", true);
    assert_eq!(b.blocks.to_bytes(), b"    ");
    assert_eq!(cursor(&v, &b), 4);
}

#[test]
fn test_expand_tab_mid_column() {
    let (mut v, mut b) = setup("ab");
    b.options.expand_tab = true;
    b.options.indent_width = 4;
    v.cursor.goto_offset(&b.blocks, 2);
    insert_text_with_options(&mut v, &mut b, b"\t", true);
    // Column 2: the tab expands to the next stop at 4
    assert_eq!(b.blocks.to_bytes(), b"ab  ");
}

#[test]
fn test_delete_and_erase_ch() {
    let (mut v, mut b) = setup("xyz");
    delete_ch(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"yz");
    assert_eq!(cursor(&v, &b), 0);

    v.cursor.goto_offset(&b.blocks, 2);
    erase_ch(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"y");
    assert_eq!(cursor(&v, &b), 1);
}

#[test]
fn test_delete_selection_replaces_it() {
    let (mut v, mut b) = setup("hello world");
    b.options.select_cursor_char = true;
    v.cursor.goto_offset(&b.blocks, 0);
    v.start_selection(&b.blocks, crate::view::SelectionKind::Chars);
    v.cursor.goto_offset(&b.blocks, 4); // "hello" via cursor char
    insert_text_with_options(&mut v, &mut b, b"bye", true);
    assert_eq!(b.blocks.to_bytes(), b"bye world");
    assert!(!v.has_selection());
}

#[test]
fn test_vertical_motion_preferred_column() {
    let (mut v, mut b) = setup("a long line\nxx\nanother long line\n");
    v.cursor.goto_offset(&b.blocks, 7); // column 7 in line 0
    move_down(&mut v, &b, 1);
    assert_eq!(cursor(&v, &b), 14); // clamped to end of "xx"
    move_down(&mut v, &b, 1);
    // Preferred column restored on the long line
    assert_eq!(cursor(&v, &b), 22);
    move_up(&mut v, &mut b, 2);
    assert_eq!(cursor(&v, &b), 7);
}

#[test]
fn test_horizontal_motion_resets_preferred() {
    let (mut v, b) = setup("abcd\nef\n");
    v.cursor.goto_offset(&b.blocks, 3);
    let _ = v.get_preferred_x(&b.blocks, &b.options);
    move_left(&mut v, &b, 1);
    assert_eq!(v.preferred_x, None);
    assert_eq!(cursor(&v, &b), 2);
    move_right(&mut v, &b, 2);
    assert_eq!(cursor(&v, &b), 4);
}

#[test]
fn test_word_motion() {
    let (mut v, b) = setup("foo bar_baz  qux\n");
    word_fwd(&mut v, &b, true);
    assert_eq!(cursor(&v, &b), 4); // start of "bar_baz"
    word_fwd(&mut v, &b, true);
    assert_eq!(cursor(&v, &b), 13); // start of "qux"
    word_bwd(&mut v, &b, true);
    assert_eq!(cursor(&v, &b), 4);
    word_bwd(&mut v, &b, true);
    assert_eq!(cursor(&v, &b), 0);
}

#[test]
fn test_delete_word() {
    let (mut v, mut b) = setup("one two three\n");
    delete_word(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"two three\n");
    assert_eq!(cursor(&v, &b), 0);
}

#[test]
fn test_erase_word() {
    let (mut v, mut b) = setup("one two three\n");
    v.cursor.goto_offset(&b.blocks, 8); // after "two "
    erase_word(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"one three\n");
    assert_eq!(cursor(&v, &b), 4);
}

#[test]
fn test_delete_eol_and_lines() {
    let (mut v, mut b) = setup("hello world\nnext\n");
    v.cursor.goto_offset(&b.blocks, 5);
    delete_eol(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"hello\nnext\n");

    delete_lines(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"next\n");
    assert_eq!(cursor(&v, &b), 0);
}

#[test]
fn test_copy_paste_linewise() {
    let (mut v, mut b) = setup("first\nsecond\n");
    let mut clip = Clipboard::new();
    copy(&mut v, &mut b, &mut clip, false);
    assert_eq!(b.blocks.to_bytes(), b"first\nsecond\n");

    // Paste below the cursor line
    paste(&mut v, &mut b, &clip);
    assert_eq!(b.blocks.to_bytes(), b"first\nfirst\nsecond\n");
    assert_eq!(cursor(&v, &b), 6);
}

#[test]
fn test_cut_charwise_paste() {
    let (mut v, mut b) = setup("hello world\n");
    b.options.select_cursor_char = true;
    let mut clip = Clipboard::new();
    v.cursor.goto_offset(&b.blocks, 0);
    v.start_selection(&b.blocks, crate::view::SelectionKind::Chars);
    v.cursor.goto_offset(&b.blocks, 4); // "hello"
    copy(&mut v, &mut b, &mut clip, true);
    assert_eq!(b.blocks.to_bytes(), b" world\n");

    v.cursor.goto_offset(&b.blocks, 6);
    paste(&mut v, &mut b, &clip);
    assert_eq!(b.blocks.to_bytes(), b" worldhello\n");
    assert_eq!(cursor(&v, &b), 11);
}

#[test]
fn test_shift_lines_indent_and_unindent() {
    let (mut v, mut b) = setup("one\ntwo\n");
    b.options.expand_tab = true;
    b.options.indent_width = 2;
    v.cursor.goto_offset(&b.blocks, 0);
    v.start_selection(&b.blocks, crate::view::SelectionKind::Lines);
    v.cursor.goto_offset(&b.blocks, 5);

    shift_lines(&mut v, &mut b, 1);
    assert_eq!(b.blocks.to_bytes(), b"  one\n  two\n");

    // One undo step for the whole shift
    let sel = v.selection;
    assert_eq!(sel, crate::view::SelectionKind::Lines);
    shift_lines(&mut v, &mut b, -1);
    assert_eq!(b.blocks.to_bytes(), b"one\ntwo\n");

    b.undo().unwrap();
    assert_eq!(b.blocks.to_bytes(), b"  one\n  two\n");
    b.undo().unwrap();
    assert_eq!(b.blocks.to_bytes(), b"one\ntwo\n");
}

#[test]
fn test_shift_tabs() {
    let (mut v, mut b) = setup("x\n");
    shift_lines(&mut v, &mut b, 2);
    assert_eq!(b.blocks.to_bytes(), b"\t\tx\n");
    shift_lines(&mut v, &mut b, -1);
    assert_eq!(b.blocks.to_bytes(), b"\tx\n");
}

#[test]
fn test_shift_skips_empty_lines() {
    let (mut v, mut b) = setup("a\n\nb\n");
    v.cursor.goto_offset(&b.blocks, 0);
    v.start_selection(&b.blocks, crate::view::SelectionKind::Lines);
    v.cursor.goto_offset(&b.blocks, 4);
    shift_lines(&mut v, &mut b, 1);
    assert_eq!(b.blocks.to_bytes(), b"\ta\n\n\tb\n");
}

#[test]
fn test_change_case() {
    let (mut v, mut b) = setup("Hello\n");
    b.options.select_cursor_char = true;
    v.cursor.goto_offset(&b.blocks, 0);
    v.start_selection(&b.blocks, crate::view::SelectionKind::Chars);
    v.cursor.goto_offset(&b.blocks, 4);
    change_case(&mut v, &mut b, CaseMode::Upper);
    assert_eq!(b.blocks.to_bytes(), b"HELLO\n");

    v.cursor.goto_offset(&b.blocks, 0);
    change_case(&mut v, &mut b, CaseMode::Lower);
    assert_eq!(b.blocks.to_bytes(), b"hELLO\n");

    v.cursor.goto_offset(&b.blocks, 0);
    v.start_selection(&b.blocks, crate::view::SelectionKind::Lines);
    change_case(&mut v, &mut b, CaseMode::Toggle);
    assert_eq!(b.blocks.to_bytes(), b"Hello\n");
}

#[test]
fn test_join_lines() {
    let (mut v, mut b) = setup("one  \n   two\nthree\n");
    join_lines(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"one two\nthree\n");

    // Joining is a single undo step
    b.undo().unwrap();
    assert_eq!(b.blocks.to_bytes(), b"one  \n   two\nthree\n");
}

#[test]
fn test_join_selected_lines() {
    let (mut v, mut b) = setup("a\nb\nc\nd\n");
    v.cursor.goto_offset(&b.blocks, 0);
    v.start_selection(&b.blocks, crate::view::SelectionKind::Lines);
    v.cursor.goto_offset(&b.blocks, 4); // through "c"
    join_lines(&mut v, &mut b);
    assert_eq!(b.blocks.to_bytes(), b"a b c\nd\n");
}
