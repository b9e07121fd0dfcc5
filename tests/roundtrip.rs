// graypack crate
extern crate graypack;

extern crate byteorder;

use byteorder::{ByteOrder, LittleEndian};

use graypack::context::PackContext;

// Small deterministic generator for test pixel data.
fn lcg(state: &mut u64) -> u16 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    ((*state >> 33) & 0xfff) as u16
}

// Encodes and decodes one frame through fresh buffers with unit strides,
// returning the packed bytes and the reconstructed pixels.
fn round_trip(ctx: &mut PackContext, w: usize, h: usize, pixels: &[u16]) -> (Vec<u8>, Vec<u16>) {
    let mut packed = vec![0u8; ctx.max_packed_size()];
    let written = ctx
        .encode_frame(pixels, 0, 1, w as isize, &mut packed)
        .unwrap();
    assert!(written <= ctx.max_packed_size());
    packed.truncate(written);

    let mut out = vec![0u16; w * h];
    ctx.decode_frame(&packed, &mut out, 0, 1, w as isize).unwrap();
    (packed, out)
}

#[test]
fn all_zeros_single_tile() {
    let mut ctx = PackContext::new(8, 8, 12, 8, 8).unwrap();
    let pixels = vec![0u16; 64];
    let (packed, out) = round_trip(&mut ctx, 8, 8, &pixels);
    // One table entry, four zero seeds, one constant delta of zero.
    assert_eq!(packed.len(), 4 + 8 + 2);
    assert_eq!(out, pixels);
}

#[test]
fn horizontal_ramp() {
    let mut ctx = PackContext::new(16, 8, 12, 16, 8).unwrap();
    let pixels: Vec<u16> = (0..8).flat_map(|_| 0..16u16).collect();
    let (packed, out) = round_trip(&mut ctx, 16, 8, &pixels);
    assert_eq!(out, pixels);
    // The ramp is highly regular; the encoder must beat the raw layout.
    assert!(packed.len() < ctx.max_packed_size());
}

#[test]
fn uncompressible_noise() {
    let mut ctx = PackContext::new(32, 16, 12, 32, 16).unwrap();
    let mut seed = 0x1234_5678;
    let pixels: Vec<u16> = (0..32 * 16).map(|_| lcg(&mut seed)).collect();
    let (packed, out) = round_trip(&mut ctx, 32, 16, &pixels);
    assert_eq!(out, pixels);
    assert!(packed.len() <= ctx.max_packed_size());
}

#[test]
fn non_multiple_tile_grid() {
    // 10x7 over 4x4 tiles: a 3x2 grid whose edge tiles shrink to
    // widths of 2 and heights of 3.
    let mut ctx = PackContext::new(10, 7, 12, 4, 4).unwrap();
    assert_eq!(ctx.tile_grid(), (3, 2));
    let mut seed = 99;
    let pixels: Vec<u16> = (0..70).map(|_| lcg(&mut seed)).collect();
    let (_, out) = round_trip(&mut ctx, 10, 7, &pixels);
    assert_eq!(out, pixels);
}

#[test]
fn short_tiles_take_two_slices() {
    // Height-2 tiles get two single-row slices each; the interior-row
    // scheduling never runs.
    let mut ctx = PackContext::new(16, 2, 12, 8, 2).unwrap();
    let mut seed = 7;
    let pixels: Vec<u16> = (0..32).map(|_| lcg(&mut seed)).collect();
    let (_, out) = round_trip(&mut ctx, 16, 2, &pixels);
    assert_eq!(out, pixels);
}

#[test]
fn uniform_tiles_use_the_constant_encoding() {
    let mut ctx = PackContext::new(10, 7, 12, 4, 4).unwrap();
    let pixels = vec![1234u16; 70];
    let mut packed = vec![0u8; ctx.max_packed_size()];
    let written = ctx.encode_frame(&pixels, 0, 1, 10, &mut packed).unwrap();

    // Every tile packs down to its seeds plus one shared delta.
    let (nx, ny) = ctx.tile_grid();
    let mut expected = 4 * nx * ny;
    for ty in 0..ny {
        for tx in 0..nx {
            let tw = 4.min(10 - tx * 4);
            let th = 4.min(7 - ty * 4);
            let seeds = th.min(4);
            let len = LittleEndian::read_u32(&packed[4 * (ty * nx + tx)..]) as usize;
            assert_eq!(len, 2 * seeds + 2, "tile {}x{}", tw, th);
            expected += len;
        }
    }
    assert_eq!(written, expected);
}

#[test]
fn length_table_sums_to_the_packed_length() {
    let mut ctx = PackContext::new(24, 18, 12, 8, 8).unwrap();
    let mut seed = 4242;
    let pixels: Vec<u16> = (0..24 * 18).map(|_| lcg(&mut seed) / 3).collect();
    let (packed, _) = round_trip(&mut ctx, 24, 18, &pixels);

    let (nx, ny) = ctx.tile_grid();
    let mut total = 4 * nx * ny;
    for slot in 0..nx * ny {
        total += LittleEndian::read_u32(&packed[4 * slot..]) as usize;
    }
    assert_eq!(total, packed.len());
}

#[test]
fn exact_length_is_required_to_decode() {
    let mut ctx = PackContext::new(16, 8, 12, 8, 8).unwrap();
    let mut seed = 31337;
    let pixels: Vec<u16> = (0..128).map(|_| lcg(&mut seed)).collect();
    let (packed, _) = round_trip(&mut ctx, 16, 8, &pixels);

    let mut out = vec![0u16; 128];
    assert!(ctx
        .decode_frame(&packed[..packed.len() - 1], &mut out, 0, 1, 16)
        .is_err());

    let mut padded = packed.clone();
    padded.push(0);
    assert!(ctx.decode_frame(&padded, &mut out, 0, 1, 16).is_err());

    // Cutting into the length table fails as well.
    assert!(ctx.decode_frame(&packed[..3], &mut out, 0, 1, 16).is_err());

    assert!(ctx.decode_frame(&packed, &mut out, 0, 1, 16).is_ok());
    assert_eq!(out, pixels);
}

#[test]
fn context_reuse_is_idempotent() {
    let mut ctx = PackContext::new(12, 12, 12, 5, 5).unwrap();
    let mut seed = 606;
    let pixels: Vec<u16> = (0..144).map(|_| lcg(&mut seed) / 17).collect();

    let (first_packed, first_out) = round_trip(&mut ctx, 12, 12, &pixels);
    let (second_packed, second_out) = round_trip(&mut ctx, 12, 12, &pixels);
    assert_eq!(first_packed, second_packed);
    assert_eq!(first_out, second_out);
}

#[test]
fn decoded_cells_have_clean_high_nibbles() {
    let mut ctx = PackContext::new(8, 8, 12, 4, 4).unwrap();
    // Junk above bit 11 must not survive the round trip.
    let pixels: Vec<u16> = (0..64u16).map(|i| (i * 321 % 4096) | 0xe000).collect();
    let (_, out) = round_trip(&mut ctx, 8, 8, &pixels);
    for (cell, pixel) in out.iter().zip(pixels.iter()) {
        assert_eq!(cell & 0xf000, 0);
        assert_eq!(*cell, pixel & 0x0fff);
    }
}

#[test]
fn planar_layout_round_trips_per_plane() {
    // Three 64x64 planes side by side in one 64x192 buffer, each
    // addressed with dx = 1, dy = 192.
    let mut ctx = PackContext::new(64, 64, 12, 16, 16).unwrap();
    let mut buf = vec![0u16; 64 * 192];
    for plane in 0..3usize {
        for row in 0..64usize {
            for col in 0..64usize {
                buf[row * 192 + plane * 64 + col] =
                    ((col * 7 + row * 13 + plane * 101) & 0xfff) as u16;
            }
        }
    }

    let mut decoded = vec![0u16; 64 * 192];
    for plane in 0..3usize {
        let mut packed = vec![0u8; ctx.max_packed_size()];
        let written = ctx
            .encode_frame(&buf, plane * 64, 1, 192, &mut packed)
            .unwrap();
        ctx.decode_frame(&packed[..written], &mut decoded, plane * 64, 1, 192)
            .unwrap();
    }
    assert_eq!(decoded, buf);
}

#[test]
fn negative_strides_round_trip() {
    // The same logical frame stored bottom-up and right-to-left must
    // produce the identical packed stream.
    let w = 16usize;
    let h = 8usize;
    let mut ctx = PackContext::new(w, h, 12, 8, 4).unwrap();
    let mut seed = 2020;
    let pixels: Vec<u16> = (0..w * h).map(|_| lcg(&mut seed)).collect();

    let mut mirrored = vec![0u16; w * h];
    for row in 0..h {
        for col in 0..w {
            mirrored[(h - 1 - row) * w + (w - 1 - col)] = pixels[row * w + col];
        }
    }

    let mut forward = vec![0u8; ctx.max_packed_size()];
    let n1 = ctx
        .encode_frame(&pixels, 0, 1, w as isize, &mut forward)
        .unwrap();
    let mut backward = vec![0u8; ctx.max_packed_size()];
    let n2 = ctx
        .encode_frame(
            &mirrored,
            w * h - 1,
            -1,
            -(w as isize),
            &mut backward,
        )
        .unwrap();
    assert_eq!(&forward[..n1], &backward[..n2]);

    let mut out = vec![0u16; w * h];
    ctx.decode_frame(
        &backward[..n2],
        &mut out,
        w * h - 1,
        -1,
        -(w as isize),
    )
    .unwrap();
    assert_eq!(out, mirrored);
}
