//! Raw cross-correlation of a template against every valid frame offset.
//!
//! Small problems are summed directly; larger ones go through the frequency
//! domain, where the cost no longer grows with the template area.

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Multiply-add count above which the FFT path is used
const DIRECT_LIMIT: u64 = 1 << 22;

/// `sum(template[ty][tx] * frame[y + ty][x + tx])` for every offset with the
/// template fully inside the frame, indexed `y * fw + x`. Other entries carry
/// no meaning.
pub(crate) fn cross_correlate(template: &[f64], tw: u32, th: u32, frame: &[u8], fw: u32, fh: u32) -> Vec<f64> {
    let offsets = (fw - tw + 1) as u64 * (fh - th + 1) as u64;
    let work = offsets * tw as u64 * th as u64;
    if work <= DIRECT_LIMIT {
        direct(template, tw, th, frame, fw, fh)
    } else {
        log::trace!("Spectral correlation for {}x{} in {}x{}", tw, th, fw, fh);
        spectral(template, tw, th, frame, fw, fh)
    }
}

pub(crate) fn direct(template: &[f64], tw: u32, th: u32, frame: &[u8], fw: u32, fh: u32) -> Vec<f64> {
    let stride = fw as usize;
    let (tw, th) = (tw as usize, th as usize);
    let mut out = vec![0.0; stride * fh as usize];

    for y in 0..=(fh as usize - th) {
        for x in 0..=(stride - tw) {
            let mut acc = 0.0;
            for ty in 0..th {
                let row = (y + ty) * stride + x;
                let t_row = ty * tw;
                for tx in 0..tw {
                    acc += template[t_row + tx] * frame[row + tx] as f64;
                }
            }
            out[y * stride + x] = acc;
        }
    }
    out
}

pub(crate) fn spectral(template: &[f64], tw: u32, th: u32, frame: &[u8], fw: u32, fh: u32) -> Vec<f64> {
    // Both signals flattened with the frame's row stride; a valid offset plus
    // any template index stays below fw * fh, so the circular product never wraps
    let stride = fw as usize;
    let used = stride * fh as usize;
    let len = used.next_power_of_two();
    let zero = Complex::new(0.0, 0.0);

    let mut spectrum = vec![zero; len];
    for (slot, &v) in spectrum.iter_mut().zip(frame) {
        *slot = Complex::new(v as f64, 0.0);
    }
    let mut kernel = vec![zero; len];
    for ty in 0..th as usize {
        for tx in 0..tw as usize {
            kernel[ty * stride + tx] = Complex::new(template[ty * tw as usize + tx], 0.0);
        }
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(len);
    forward.process(&mut spectrum);
    forward.process(&mut kernel);
    for (f, t) in spectrum.iter_mut().zip(&kernel) {
        *f *= t.conj();
    }
    planner.plan_fft_inverse(len).process(&mut spectrum);

    let scale = 1.0 / len as f64;
    spectrum.iter().take(used).map(|c| c.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize, seed: u32) -> Vec<u8> {
        (0..len as u32)
            .map(|i| ((i.wrapping_add(seed).wrapping_mul(2_654_435_761)) >> 24) as u8)
            .collect()
    }

    #[test]
    fn test_spectral_agrees_with_direct() {
        let (fw, fh, tw, th) = (37u32, 23u32, 9u32, 6u32);
        let frame = noise((fw * fh) as usize, 3);
        let template: Vec<f64> = noise((tw * th) as usize, 11)
            .into_iter()
            .map(|v| v as f64 - 127.5)
            .collect();

        let slow = direct(&template, tw, th, &frame, fw, fh);
        let fast = spectral(&template, tw, th, &frame, fw, fh);

        for y in 0..=(fh - th) as usize {
            for x in 0..=(fw - tw) as usize {
                let i = y * fw as usize + x;
                assert!(
                    (slow[i] - fast[i]).abs() < 1e-6 * slow[i].abs().max(1.0),
                    "offset ({x}, {y}): {} vs {}",
                    slow[i],
                    fast[i]
                );
            }
        }
    }

    #[test]
    fn test_direct_single_offset() {
        let frame = [1u8, 2, 3, 4];
        let template = [1.0, -1.0, 0.5, 2.0];
        let out = direct(&template, 2, 2, &frame, 2, 2);
        assert_eq!(out[0], 1.0 - 2.0 + 1.5 + 8.0);
    }
}
