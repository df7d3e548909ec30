use super::*;
use serde_json::json;

#[test]
fn parses_short_and_long_hex() {
    assert_eq!(parse_hex_lenient("#fff"), Rgb8::WHITE);
    assert_eq!(parse_hex_lenient("#000000"), Rgb8::BLACK);
    assert_eq!(parse_hex_lenient("#ABCDEF"), Rgb8::new(171, 205, 239));
    assert_eq!(parse_hex_lenient("#abcdef"), Rgb8::new(171, 205, 239));
    assert_eq!(parse_hex_lenient("#1a2"), Rgb8::new(0x11, 0xaa, 0x22));
}

#[test]
fn hash_prefix_is_optional() {
    assert_eq!(parse_hex_lenient("ff0000"), Rgb8::new(255, 0, 0));
    assert_eq!(parse_hex_lenient("0f0"), Rgb8::new(0, 255, 0));
}

#[test]
fn malformed_hex_is_black() {
    for bad in ["", "#", "#ff", "#ffff", "#gggggg", "#ff00ff00", "red", "#ff 00 0", "#-12"] {
        assert_eq!(parse_hex_lenient(bad), Rgb8::BLACK, "input {bad:?}");
        assert_eq!(parse_hex(bad), None, "input {bad:?}");
    }
}

#[test]
fn non_ascii_input_does_not_panic() {
    assert_eq!(parse_hex_lenient("#é12"), Rgb8::BLACK);
    assert_eq!(parse_hex_lenient("ÿÿÿ"), Rgb8::BLACK);
}

#[test]
fn color_spec_from_json() {
    let c: ColorSpec = serde_json::from_value(json!("#00ff00")).unwrap();
    assert_eq!(c.resolve(), Rgb8::new(0, 255, 0));

    let c: ColorSpec = serde_json::from_value(json!(12345)).unwrap();
    assert_eq!(c, ColorSpec::Other(json!(12345)));
    assert_eq!(c.resolve(), Rgb8::BLACK);

    let c: ColorSpec = serde_json::from_value(json!({"r": 1})).unwrap();
    assert_eq!(c.resolve(), Rgb8::BLACK);
}
