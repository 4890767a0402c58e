use connmat::CompressedMatrix;
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok(view) = CompressedMatrix::new(data) {
                for r in 0..view.num_rows() {
                    let _ = view.row(r);
                }
            }
        });
    }
}
