use super::*;

#[test]
fn even_ceil_only_bumps_odd_values() {
    assert_eq!(even_ceil(0), 0);
    assert_eq!(even_ceil(620), 620);
    assert_eq!(even_ceil(621), 622);
}

#[test]
fn layout_bumps_odd_width() {
    let l = FrameLayout::normalized(621, 300, 60).unwrap();
    assert_eq!(l.width, 622);
    assert_eq!(l.canvas_height, 300);
    assert_eq!(l.total_height, 360);
}

#[test]
fn layout_bumps_odd_total_height_into_footer() {
    let l = FrameLayout::normalized(620, 300, 59).unwrap();
    assert_eq!(l.total_height, 360);
    assert_eq!(l.footer_height, 59);
    assert_eq!(l.footer_rows(), 60);
    assert_eq!(l.frame_len(), 620 * 360 * 3);
}

#[test]
fn layout_bumps_odd_canvas_height_before_adding_footer() {
    let l = FrameLayout::normalized(4, 301, 60).unwrap();
    assert_eq!(l.canvas_height, 302);
    assert_eq!(l.total_height, 362);
}

#[test]
fn layout_without_footer_keeps_canvas_height() {
    let l = FrameLayout::normalized(4, 4, 0).unwrap();
    assert_eq!(l.total_height, 4);
    assert_eq!(l.footer_rows(), 0);
}

#[test]
fn layout_rejects_zero_dimensions() {
    assert!(FrameLayout::normalized(0, 10, 60).is_err());
    assert!(FrameLayout::normalized(10, 0, 60).is_err());
}
