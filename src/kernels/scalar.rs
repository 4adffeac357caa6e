//! Scalar tile kernel.

/// `C += A * B` for one `m × m` tile with a plain triple loop.
///
/// Each output element is summed in a local accumulator over the full
/// reduction and written back once. Works for any `m`.
pub fn accumulate_tile(a: &[f32], b: &[f32], c: &mut [f32], m: usize) {
    debug_assert!(a.len() == m * m && b.len() == m * m && c.len() == m * m);

    for (a_row, c_row) in a.chunks_exact(m).zip(c.chunks_exact_mut(m)) {
        for (j, out) in c_row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum += a_ik * b[k * m + j];
            }
            *out += sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2x2_product() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        let mut c = [0.0; 4];
        accumulate_tile(&a, &b, &mut c, 2);
        assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_accumulates_into_existing_values() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        let mut c = [1.0, 1.0, 1.0, 1.0];
        accumulate_tile(&a, &b, &mut c, 2);
        accumulate_tile(&a, &b, &mut c, 2);
        assert_eq!(c, [39.0, 45.0, 87.0, 101.0]);
    }

    #[test]
    fn test_odd_tile_size() {
        let m = 3;
        let a: Vec<f32> = (0..9).map(|x| x as f32).collect();
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut c = vec![0.0; 9];
        accumulate_tile(&a, &identity, &mut c, m);
        assert_eq!(c, a);
    }
}
