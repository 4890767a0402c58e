use connmat::{encode, CompressedMatrix, CostMatrix, EncodeConfig};
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let n = (data.len() as f64).sqrt() as usize;
            let rows: Vec<Vec<i32>> = data[..n * n]
                .chunks(n.max(1))
                .map(|r| r.iter().map(|&b| (b % 9) as i32 * 1000).collect())
                .collect();
            let Ok(matrix) = CostMatrix::from_rows(&rows) else {
                return;
            };
            let blob = encode(&matrix, &EncodeConfig::raw()).expect("encode failed");
            let view = CompressedMatrix::new(&blob).expect("decoder rejected encoder output");
            assert_eq!(view.to_matrix().expect("decode failed"), matrix);
        });
    }
}
