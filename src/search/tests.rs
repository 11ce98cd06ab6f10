use super::*;
use crate::view::SelectionKind;

fn setup(text: &str) -> (View, Buffer) {
    (View::new(0), Buffer::from_bytes(text.as_bytes()))
}

fn no_confirm() -> impl FnMut() -> ConfirmAnswer {
    || panic!("confirm must not be consulted")
}

#[test]
fn test_forward_search() {
    let (mut v, b) = setup("alpha\nbeta\ngamma\n");
    let mut s = SearchState::new();
    s.set_pattern("ma");
    let r = search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(r, SearchOutcome::Found);
    assert_eq!(v.cursor.get_offset(&b.blocks), 14); // "ma" in gamma

    // Again from there: wraps and finds the same match
    let r = search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(r, SearchOutcome::FoundWrapped);
    assert_eq!(v.cursor.get_offset(&b.blocks), 14);
}

#[test]
fn test_forward_skips_match_at_cursor() {
    let (mut v, b) = setup("xx xx xx\n");
    let mut s = SearchState::new();
    s.set_pattern("xx");
    search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(v.cursor.get_offset(&b.blocks), 3);
    search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(v.cursor.get_offset(&b.blocks), 6);
}

#[test]
fn test_backward_search() {
    let (mut v, b) = setup("one two\nthree two\n");
    let mut s = SearchState::new();
    s.set_pattern("two");
    s.reverse = true;
    v.cursor.goto_offset(&b.blocks, 17); // end of last line
    let r = search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(r, SearchOutcome::Found);
    assert_eq!(v.cursor.get_offset(&b.blocks), 14);
    // Last match strictly before the cursor
    let r = search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(r, SearchOutcome::Found);
    assert_eq!(v.cursor.get_offset(&b.blocks), 4);
}

#[test]
fn test_search_prev_toggles_direction() {
    let (mut v, b) = setup("ab ab ab\n");
    let mut s = SearchState::new();
    s.set_pattern("ab");
    search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(v.cursor.get_offset(&b.blocks), 6);
    search_prev(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap();
    assert_eq!(v.cursor.get_offset(&b.blocks), 3);
    assert!(!s.reverse);
}

#[test]
fn test_auto_case_sensitivity() {
    let (mut v, b) = setup("Foo foo\n");
    let mut s = SearchState::new();
    // Lowercase pattern: insensitive, matches "Foo" at 0... but the
    // cursor starts there, so the skip rule moves to "foo"
    s.set_pattern("foo");
    search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::Auto).unwrap();
    assert_eq!(v.cursor.get_offset(&b.blocks), 4);

    // Uppercase pattern: sensitive
    v.cursor = BlockIter::bof();
    v.cursor.skip_bytes(&b.blocks, 1);
    s.set_pattern("Foo");
    let r = search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::Auto).unwrap();
    assert_eq!(r, SearchOutcome::FoundWrapped);
    assert_eq!(v.cursor.get_offset(&b.blocks), 0);
}

#[test]
fn test_not_found_and_no_pattern() {
    let (mut v, b) = setup("abc\n");
    let mut s = SearchState::new();
    assert_eq!(
        search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap(),
        SearchOutcome::NoPattern
    );
    s.set_pattern("zzz");
    assert_eq!(
        search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).unwrap(),
        SearchOutcome::NotFound
    );
}

#[test]
fn test_invalid_regex_reports_error() {
    let (mut v, b) = setup("abc\n");
    let mut s = SearchState::new();
    s.set_pattern("(unclosed");
    assert!(search_next(&mut v, &b.blocks, &mut s, CaseSensitivity::True).is_err());
}

#[test]
fn test_replace_simple() {
    let (mut v, mut b) = setup("cat dog cat\n");
    let r = reg_replace(
        &mut v,
        &mut b,
        "cat",
        "bird",
        ReplaceFlags::default(),
        &mut no_confirm(),
    )
    .unwrap();
    // Without -g only the first match per line is replaced
    assert_eq!(r.substitutions, 1);
    assert_eq!(b.blocks.to_bytes(), b"bird dog cat\n");
}

#[test]
fn test_replace_global_and_undo_as_one() {
    let (mut v, mut b) = setup("a a a\na a\n");
    let flags = ReplaceFlags {
        global: true,
        ..Default::default()
    };
    let r = reg_replace(&mut v, &mut b, "a", "XY", flags, &mut no_confirm()).unwrap();
    assert_eq!(r.substitutions, 5);
    assert_eq!(r.lines, 2);
    assert_eq!(b.blocks.to_bytes(), b"XY XY XY\nXY XY\n");

    // The whole pass is one undo step
    b.undo().unwrap();
    assert_eq!(b.blocks.to_bytes(), b"a a a\na a\n");
}

#[test]
fn test_replace_captures_and_format() {
    let (mut v, mut b) = setup("john smith\n");
    let flags = ReplaceFlags::default();
    reg_replace(
        &mut v,
        &mut b,
        r"(\w+) (\w+)",
        r"\2, \1 & \0more",
        flags,
        &mut no_confirm(),
    )
    .unwrap();
    // \2 \1 are captures, & the whole match, \0 is literal '0'
    assert_eq!(b.blocks.to_bytes(), b"smith, john john smith 0more\n");
}

#[test]
fn test_replace_ignore_case_flag() {
    let (mut v, mut b) = setup("Dog dog DOG\n");
    let flags = ReplaceFlags {
        global: true,
        ignore_case: true,
        ..Default::default()
    };
    let r = reg_replace(&mut v, &mut b, "dog", "cat", flags, &mut no_confirm()).unwrap();
    assert_eq!(r.substitutions, 3);
    assert_eq!(b.blocks.to_bytes(), b"cat cat cat\n");
}

#[test]
fn test_replace_basic_regex() {
    let (mut v, mut b) = setup("a(b)c\n");
    let flags = ReplaceFlags {
        basic: true,
        ..Default::default()
    };
    // In BRE, plain parens are literals
    reg_replace(&mut v, &mut b, "(b)", "X", flags, &mut no_confirm()).unwrap();
    assert_eq!(b.blocks.to_bytes(), b"aXc\n");
}

#[test]
fn test_replace_confirm_answers() {
    let (mut v, mut b) = setup("x x x x\n");
    let flags = ReplaceFlags {
        confirm: true,
        global: true,
        ..Default::default()
    };
    let answers = std::cell::RefCell::new(vec![
        ConfirmAnswer::Yes,
        ConfirmAnswer::No,
        ConfirmAnswer::All,
    ]);
    let mut confirm = || {
        let mut a = answers.borrow_mut();
        if a.is_empty() {
            ConfirmAnswer::Yes
        } else {
            a.remove(0)
        }
    };
    let r = reg_replace(&mut v, &mut b, "x", "Y", flags, &mut confirm).unwrap();
    // y, n, then a: the rest replaced without prompting
    assert_eq!(r.substitutions, 3);
    assert_eq!(b.blocks.to_bytes(), b"Y x Y Y\n");
}

#[test]
fn test_replace_cancel_keeps_applied_as_one_undo() {
    let (mut v, mut b) = setup("k k k\n");
    let flags = ReplaceFlags {
        confirm: true,
        global: true,
        ..Default::default()
    };
    let answers = std::cell::RefCell::new(vec![
        ConfirmAnswer::All,
        // All stops prompting; quit never reached
    ]);
    let mut confirm = || answers.borrow_mut().remove(0);
    let r = reg_replace(&mut v, &mut b, "k", "Q", flags, &mut confirm).unwrap();
    assert!(!r.cancelled);
    assert_eq!(b.blocks.to_bytes(), b"Q Q Q\n");
    b.undo().unwrap();
    assert_eq!(b.blocks.to_bytes(), b"k k k\n");

    // Now: one yes then quit; the applied replacement stays, undoable
    let (mut v, mut b) = setup("k k k\n");
    let answers = std::cell::RefCell::new(vec![ConfirmAnswer::Yes, ConfirmAnswer::Quit]);
    let mut confirm = || answers.borrow_mut().remove(0);
    let r = reg_replace(&mut v, &mut b, "k", "Q", flags, &mut confirm).unwrap();
    assert!(r.cancelled);
    assert_eq!(r.substitutions, 1);
    assert_eq!(b.blocks.to_bytes(), b"Q k k\n");
    b.undo().unwrap();
    assert_eq!(b.blocks.to_bytes(), b"k k k\n");
}

#[test]
fn test_replace_within_selection() {
    let (mut v, mut b) = setup("aaa\nbbb aaa\naaa\n");
    // Select the middle line
    v.cursor.goto_offset(&b.blocks, 5);
    v.start_selection(&b.blocks, SelectionKind::Lines);
    let flags = ReplaceFlags {
        global: true,
        ..Default::default()
    };
    let r = reg_replace(&mut v, &mut b, "aaa", "ZZ", flags, &mut no_confirm()).unwrap();
    assert_eq!(r.substitutions, 1);
    assert_eq!(b.blocks.to_bytes(), b"aaa\nbbb ZZ\naaa\n");
}

#[test]
fn test_replace_empty_pattern_is_error() {
    let (mut v, mut b) = setup("x\n");
    assert!(reg_replace(
        &mut v,
        &mut b,
        "",
        "y",
        ReplaceFlags::default(),
        &mut no_confirm()
    )
    .is_err());
}

#[test]
fn test_bre_translation() {
    assert_eq!(bre_to_ere(r"a\(b\)c"), "a(b)c");
    assert_eq!(bre_to_ere("a(b)c"), r"a\(b\)c");
    assert_eq!(bre_to_ere(r"x\+"), "x+");
    assert_eq!(bre_to_ere("x+"), r"x\+");
    assert_eq!(bre_to_ere(r"\."), r"\.");
}
