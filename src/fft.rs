//! Radix-2 decimation-in-time FFT over paired real/imaginary arrays.
//!
//! This is a correctness reference, not a performance one: a production
//! build could substitute an optimized FFT crate with identical numerical
//! output. It is written out by hand here because the spectral peak picker
//! downstream is sensitive to exact bin-for-bin magnitude values, and the
//! rest of this crate's test vectors are pinned against this algorithm's
//! specific rounding behavior.

use crate::error::{FingerprintError, Result};

/// Performs an in-place FFT on `re`/`im`, which must have equal,
/// power-of-two length.
///
/// Bit-reversal permutation followed by `log2(n)` butterfly stages, each
/// with twiddle factors recurrenced as `w <- w * w_len` rather than
/// recomputed from trigonometric functions at every butterfly.
pub fn fft_in_place(re: &mut [f32], im: &mut [f32]) -> Result<()> {
    let n = re.len();
    if im.len() != n {
        return Err(FingerprintError::InvalidFftLength(n));
    }
    if n == 0 || !n.is_power_of_two() {
        return Err(FingerprintError::InvalidFftLength(n));
    }

    bit_reverse_permute(re, im);

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle_step = -2.0 * std::f32::consts::PI / len as f32;
        let w_len_re = angle_step.cos();
        let w_len_im = angle_step.sin();

        let mut start = 0;
        while start < n {
            let mut w_re = 1.0f32;
            let mut w_im = 0.0f32;

            for k in 0..half {
                let even_idx = start + k;
                let odd_idx = start + k + half;

                let odd_re = re[odd_idx] * w_re - im[odd_idx] * w_im;
                let odd_im = re[odd_idx] * w_im + im[odd_idx] * w_re;

                let even_re = re[even_idx];
                let even_im = im[even_idx];

                re[even_idx] = even_re + odd_re;
                im[even_idx] = even_im + odd_im;
                re[odd_idx] = even_re - odd_re;
                im[odd_idx] = even_im - odd_im;

                let next_w_re = w_re * w_len_re - w_im * w_len_im;
                let next_w_im = w_re * w_len_im + w_im * w_len_re;
                w_re = next_w_re;
                w_im = next_w_im;
            }

            start += len;
        }

        len *= 2;
    }

    Ok(())
}

fn bit_reverse_permute(re: &mut [f32], im: &mut [f32]) {
    let n = re.len();
    let bits = n.trailing_zeros();

    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            re.swap(i, j);
            im.swap(i, j);
        }
    }
}
