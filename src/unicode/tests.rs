use super::*;

#[test]
fn test_ascii_round_trip() {
    let buf = b"hello";
    let mut i = 0;
    assert_eq!(get_char(buf, &mut i), CodePoint::Unicode('h'));
    assert_eq!(i, 1);
    let cp = prev_char(buf, &mut i);
    assert_eq!(cp, CodePoint::Unicode('h'));
    assert_eq!(i, 0);
}

#[test]
fn test_multibyte_round_trip() {
    let buf = "aé漢🙂".as_bytes();
    let mut i = 0;
    let mut stops = vec![0];
    while i < buf.len() {
        let before = i;
        let cp = get_char(buf, &mut i);
        assert_eq!(i - before, cp.len_utf8());
        stops.push(i);
    }
    // Walk back over the same boundaries
    for expect in stops.iter().rev().skip(1) {
        prev_char(buf, &mut i);
        assert_eq!(i, *expect);
    }
}

#[test]
fn test_invalid_bytes_step_one() {
    // Lone continuation byte, truncated sequence, overlong encoding
    for buf in [&[0x80u8, b'a'][..], &[0xe2, 0x82][..], &[0xc0, 0xaf][..]] {
        let mut i = 0;
        let cp = get_char(buf, &mut i);
        assert!(matches!(cp, CodePoint::Invalid(_)));
        assert_eq!(i, 1);
    }
}

#[test]
fn test_prev_char_invalid() {
    let buf = &[b'a', 0xff];
    let mut i = 2;
    assert_eq!(prev_char(buf, &mut i), CodePoint::Invalid(0xff));
    assert_eq!(i, 1);
}

#[test]
fn test_surrogate_rejected() {
    // 0xED 0xA0 0x80 encodes U+D800
    let buf = &[0xed, 0xa0, 0x80];
    let mut i = 0;
    assert!(matches!(get_char(buf, &mut i), CodePoint::Invalid(0xed)));
    assert_eq!(i, 1);
}

#[test]
fn test_widths() {
    assert_eq!(CodePoint::Unicode('a').width(), 1);
    assert_eq!(CodePoint::Unicode('漢').width(), 2);
    assert_eq!(CodePoint::Unicode('\x01').width(), 2); // ^A
    assert_eq!(CodePoint::Unicode('\u{7f}').width(), 2); // ^?
    assert_eq!(CodePoint::Invalid(0xff).width(), 4); // <ff>
    assert_eq!(CodePoint::Unicode('\u{0301}').width(), 0); // combining acute
}

#[test]
fn test_zero_width() {
    assert!(CodePoint::Unicode('\u{0301}').is_zero_width());
    assert!(CodePoint::Unicode('\u{200d}').is_zero_width()); // ZWJ
    assert!(!CodePoint::Unicode('a').is_zero_width());
    assert!(!CodePoint::Unicode('\n').is_zero_width());
    assert!(!CodePoint::Invalid(0x80).is_zero_width());
}

#[test]
fn test_tab_width() {
    assert_eq!(tab_width_at(0, 8), 8);
    assert_eq!(tab_width_at(3, 8), 5);
    assert_eq!(tab_width_at(7, 8), 1);
    assert_eq!(tab_width_at(8, 8), 8);
    assert_eq!(tab_width_at(2, 4), 2);
}

#[test]
fn test_str_width_tabs() {
    assert_eq!(str_width(b"ab\tc", 8), 9); // 2 + 6 + 1
    assert_eq!(str_width("é漢".as_bytes(), 8), 3);
}

#[test]
fn test_encode_codepoint() {
    let mut out = Vec::new();
    assert!(encode_codepoint(0x1f642, &mut out));
    assert_eq!(out, "🙂".as_bytes());
    out.clear();
    assert!(!encode_codepoint(0xd800, &mut out));
    assert!(out.is_empty());
}

#[test]
fn test_utf16_round_trip() {
    let text = "héllo\nwörld 🙂";
    for be in [true, false] {
        let enc = utf8_to_utf16(text.as_bytes(), be);
        assert_eq!(utf16_to_utf8(&enc, be), text.as_bytes());
    }
}

#[test]
fn test_utf32_round_trip() {
    let text = "héllo\nwörld 🙂";
    for be in [true, false] {
        let enc = utf8_to_utf32(text.as_bytes(), be);
        assert_eq!(utf32_to_utf8(&enc, be), text.as_bytes());
    }
}
