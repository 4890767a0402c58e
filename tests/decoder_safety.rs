use connmat::{encode, CompressedMatrix, ConnmatError, CostMatrix, EncodeConfig, INVALID_COST};
use rand::Rng;

fn sample_blob(cfg: EncodeConfig) -> Vec<u8> {
    let n = 21;
    let mut m = CostMatrix::new(n, 7);
    for r in 0..n {
        m.set(r, (r * 5) % n, 100 + r as i32);
        m.set(r, (r * 3 + 1) % n, INVALID_COST as i32);
    }
    m.set(0, 0, 0);
    encode(&m, &cfg).unwrap()
}

fn is_malformed(data: &[u8]) -> bool {
    matches!(CompressedMatrix::new(data), Err(ConnmatError::MalformedBlob(_)))
}

/// Offset of the first row block (21 rows -> 42 bytes of modes + 2 padding).
const FIRST_ROW: usize = 8 + 44;

#[test]
fn sample_is_valid() {
    for cfg in [EncodeConfig::raw(), EncodeConfig::quantized()] {
        assert!(CompressedMatrix::new(&sample_blob(cfg)).is_ok());
    }
}

#[test]
fn every_truncation_fails() {
    let blob = sample_blob(EncodeConfig::raw());
    for len in 0..blob.len() {
        assert!(is_malformed(&blob[..len]), "prefix of {len} bytes accepted");
    }
}

#[test]
fn bad_magic_fails() {
    let mut blob = sample_blob(EncodeConfig::raw());
    blob.swap(0, 1);
    assert!(is_malformed(&blob));
}

#[test]
fn unaligned_lengths_fail() {
    let mut blob = sample_blob(EncodeConfig::raw());
    blob[FIRST_ROW] = 3;
    assert!(is_malformed(&blob));
}

#[test]
fn mismatched_lengths_fail() {
    let mut blob = sample_blob(EncodeConfig::raw());
    // values length zero while the compact bitmap is not
    blob[FIRST_ROW + 2] = 0;
    blob[FIRST_ROW + 3] = 0;
    assert!(is_malformed(&blob));
}

#[test]
fn dirty_chunk_padding_fails() {
    let mut blob = sample_blob(EncodeConfig::raw());
    // 21 columns -> 3 chunks, bit 7 of the first chunk byte is padding.
    blob[FIRST_ROW + 4] |= 0x80;
    assert!(is_malformed(&blob));
}

#[test]
fn dirty_value_padding_fails() {
    let mut blob = sample_blob(EncodeConfig::quantized());
    // Row 0 stores two cells, so its value section ends in padding.
    let compact_len = u16::from_le_bytes([blob[FIRST_ROW], blob[FIRST_ROW + 1]]) as usize;
    let values_len = u16::from_le_bytes([blob[FIRST_ROW + 2], blob[FIRST_ROW + 3]]) as usize;
    let values_end = FIRST_ROW + 4 + 4 + compact_len + values_len;
    blob[values_end - 1] = 1;
    assert!(is_malformed(&blob));
}

#[test]
fn stored_value_equal_to_mode_fails() {
    let mut blob = sample_blob(EncodeConfig::raw());
    // Row 0 has mode 7 and stores 0 at column 0; a mode of 0 makes that
    // explicit cell redundant, which the encoder never produces.
    assert_eq!(&blob[8..10], &[7, 0]);
    blob[8] = 0;
    assert!(is_malformed(&blob));

    // Quantized blobs cannot be checked this way and stay valid.
    let mut blob = sample_blob(EncodeConfig::quantized());
    blob[8] = 0;
    assert!(CompressedMatrix::new(&blob).is_ok());
}

#[test]
fn random_bit_flips_never_panic() {
    let mut rng = rand::thread_rng();
    for cfg in [EncodeConfig::raw(), EncodeConfig::quantized()] {
        let blob = sample_blob(cfg);
        for _ in 0..500 {
            let mut buf = blob.clone();
            let bit = rng.gen_range(0..buf.len() * 8);
            buf[bit / 8] ^= 1 << (bit % 8);
            if let Ok(view) = CompressedMatrix::new(&buf) {
                for r in 0..view.num_rows() {
                    assert!(view.row(r).is_ok());
                }
            }
        }
    }
}

#[test]
fn random_bytes_never_panic() {
    let mut rng = rand::thread_rng();
    for _ in 0..2000 {
        let len = rng.gen_range(0..96);
        let mut buf: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        if buf.len() >= 2 && rng.gen_bool(0.5) {
            buf[0] = 0xAB;
            buf[1] = 0xCD;
        }
        let _ = CompressedMatrix::new(&buf);
    }
}
