use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    assert_eq!(over([10, 20, 30, 255], [0, 0, 0, 0]), [10, 20, 30, 255]);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([10, 20, 30, 255], [1, 2, 3, 255]), [1, 2, 3, 255]);
}

#[test]
fn over_half_alpha_blends() {
    // Premultiplied white @ 50% over opaque black.
    assert_eq!(over([0, 0, 0, 255], [128, 128, 128, 128]), [128, 128, 128, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
}

#[test]
fn unpremultiply_restores_straight_color() {
    let mut px = vec![128u8, 0, 0, 128, 7, 8, 9, 255, 0, 0, 0, 0];
    unpremultiply_in_place(&mut px);
    assert_eq!(&px[..4], &[255, 0, 0, 128]);
    assert_eq!(&px[4..8], &[7, 8, 9, 255]);
    assert_eq!(&px[8..], &[0, 0, 0, 0]);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    // Straight red @ 50% alpha => rgb becomes 128,0,0 over black.
    let src = vec![255u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_alpha_0_returns_bg() {
    let src = vec![200u8, 100, 50, 0];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}
