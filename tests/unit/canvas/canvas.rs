use super::*;

const RED: Rgb8 = Rgb8::new(255, 0, 0);

#[test]
fn filled_canvas_has_uniform_color() {
    let c = Canvas::filled(3, 2, Rgb8::WHITE).unwrap();
    assert_eq!(c.as_bytes().len(), 3 * 2 * 3);
    assert!(c.as_bytes().iter().all(|&b| b == 255));
}

#[test]
fn zero_sized_canvas_is_rejected() {
    assert!(Canvas::filled(0, 2, Rgb8::WHITE).is_err());
    assert!(Canvas::from_rgb8(2, 2, vec![0; 11]).is_err());
}

#[test]
fn clip_rect_inside_keeps_size() {
    let c = Canvas::filled(10, 10, Rgb8::WHITE).unwrap();
    let r = c.clip_rect(2, 3, 4, 5).unwrap();
    assert_eq!(
        r,
        PixelRect {
            x0: 2,
            y0: 3,
            x1: 6,
            y1: 8
        }
    );
    assert_eq!(r.area(), 20);
}

#[test]
fn clip_rect_clamps_start_then_extends_from_clamped_corner() {
    let c = Canvas::filled(10, 10, Rgb8::WHITE).unwrap();
    let r = c.clip_rect(-3, -1, 4, 2).unwrap();
    assert_eq!(
        r,
        PixelRect {
            x0: 0,
            y0: 0,
            x1: 4,
            y1: 2
        }
    );
}

#[test]
fn clip_rect_truncates_at_far_edge() {
    let c = Canvas::filled(10, 10, Rgb8::WHITE).unwrap();
    let r = c.clip_rect(8, 9, 5, 5).unwrap();
    assert_eq!((r.width(), r.height()), (2, 1));
}

#[test]
fn clip_rect_degenerate_cases_are_none() {
    let c = Canvas::filled(10, 10, Rgb8::WHITE).unwrap();
    assert!(c.clip_rect(10, 0, 1, 1).is_none());
    assert!(c.clip_rect(0, 25, 1, 1).is_none());
    assert!(c.clip_rect(1, 1, 0, 1).is_none());
    assert!(c.clip_rect(1, 1, -2, 1).is_none());
    assert!(c.clip_rect(i64::MAX, 0, i64::MAX, 1).is_none());
}

#[test]
fn fill_rect_touches_only_the_rect() {
    let mut c = Canvas::filled(4, 4, Rgb8::WHITE).unwrap();
    let r = c.clip_rect(1, 1, 2, 2).unwrap();
    c.fill_rect(r, RED);
    for y in 0..4 {
        for x in 0..4 {
            let inside = (1..3).contains(&x) && (1..3).contains(&y);
            let want = if inside { RED } else { Rgb8::WHITE };
            assert_eq!(c.pixel(x, y), Some(want), "pixel ({x},{y})");
        }
    }
}

#[test]
fn pixel_out_of_range_is_none() {
    let c = Canvas::filled(2, 2, Rgb8::WHITE).unwrap();
    assert_eq!(c.pixel(2, 0), None);
    assert_eq!(c.pixel(0, 2), None);
}

#[test]
fn into_image_keeps_dimensions() {
    let c = Canvas::filled(5, 3, RED).unwrap();
    let img = c.into_image().unwrap();
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(4, 2).0, [255, 0, 0]);
}
