use super::*;

#[test]
fn test_insert_delete_round_trip() {
    let mut b = Buffer::new();
    assert!(!b.modified());

    b.begin_change(MergeKind::None);
    b.insert_bytes(0, b"hello world\n");
    b.end_change();
    assert_eq!(b.blocks.to_bytes(), b"hello world\n");
    assert!(b.modified());

    b.begin_change(MergeKind::None);
    b.delete_bytes(5, 6);
    b.end_change();
    assert_eq!(b.blocks.to_bytes(), b"hello\n");

    assert_eq!(b.undo(), Some(5));
    assert_eq!(b.blocks.to_bytes(), b"hello world\n");
    assert_eq!(b.undo(), Some(0));
    assert_eq!(b.blocks.to_bytes(), b"");
    assert!(!b.modified());
    assert_eq!(b.undo(), None);

    assert_eq!(b.redo(None), Ok(0));
    assert_eq!(b.blocks.to_bytes(), b"hello world\n");
}

#[test]
fn test_backspace_scenario() {
    // Type "abc", press backspace once
    let mut b = Buffer::new();
    for (i, ch) in [b"a", b"b", b"c"].iter().enumerate() {
        b.begin_change(MergeKind::Insert);
        b.insert_bytes(i, *ch);
        b.end_change();
    }
    b.begin_change(MergeKind::None);
    b.erase_bytes(2, 1);
    b.end_change();

    assert_eq!(b.blocks.to_bytes(), b"ab");
    assert!(b.modified());

    // Undo restores "abc" with the cursor after the erased byte
    assert_eq!(b.undo(), Some(3));
    assert_eq!(b.blocks.to_bytes(), b"abc");
    // The typed run was merged: one more undo empties the buffer
    assert_eq!(b.undo(), Some(0));
    assert_eq!(b.blocks.to_bytes(), b"");
    assert_eq!(b.redo(None), Ok(0));
    assert_eq!(b.blocks.to_bytes(), b"abc");
}

#[test]
fn test_modified_follows_save_point() {
    let mut b = Buffer::new();
    b.begin_change(MergeKind::None);
    b.insert_bytes(0, b"x");
    b.end_change();
    assert!(b.modified());
    b.mark_saved();
    assert!(!b.modified());
    b.undo();
    assert!(b.modified());
    b.redo(None).unwrap();
    assert!(!b.modified());
}

#[test]
fn test_dirty_line_tracking() {
    let mut b = Buffer::from_bytes(b"one\ntwo\nthree\n");
    b.take_changed_lines();

    b.begin_change(MergeKind::None);
    b.replace_bytes(4, 3, b"TWO");
    b.end_change();
    assert_eq!(b.take_changed_lines(), Some((1, 1)));

    // Inserting a newline dirties everything below
    b.begin_change(MergeKind::None);
    b.insert_bytes(4, b"half\n");
    b.end_change();
    assert_eq!(b.take_changed_lines(), Some((1, 3)));
}

#[test]
fn test_mark_lines_changed_union() {
    let mut b = Buffer::new();
    b.mark_lines_changed(5, 7);
    b.mark_lines_changed(2, 3);
    b.mark_lines_changed(9, 6);
    assert_eq!(b.take_changed_lines(), Some((2, 9)));
    assert_eq!(b.take_changed_lines(), None);
}

#[test]
fn test_change_chain_via_buffer() {
    let mut b = Buffer::from_bytes(b"aaa bbb\n");
    b.begin_change_chain();
    b.replace_bytes(0, 3, b"xx");
    b.replace_bytes(3, 3, b"yy");
    b.end_change_chain();
    assert_eq!(b.blocks.to_bytes(), b"xx yy\n");

    assert_eq!(b.undo(), Some(0));
    assert_eq!(b.blocks.to_bytes(), b"aaa bbb\n");
}
