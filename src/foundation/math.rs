pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Premultiply straight-alpha RGBA8 in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = mul_div255_u16(u16::from(px[0]), a) as u8;
        px[1] = mul_div255_u16(u16::from(px[1]), a) as u8;
        px[2] = mul_div255_u16(u16::from(px[2]), a) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div255_rounds_to_nearest() {
        assert_eq!(mul_div255_u16(255, 255), 255);
        assert_eq!(mul_div255_u16(255, 128), 128);
        assert_eq!(mul_div255_u16(0, 200), 0);
    }

    #[test]
    fn premultiply_zeroes_transparent_pixels() {
        let mut px = vec![200u8, 100, 50, 0, 255, 0, 0, 128];
        premultiply_rgba8_in_place(&mut px);
        assert_eq!(px, vec![0, 0, 0, 0, 128, 0, 0, 128]);
    }
}
