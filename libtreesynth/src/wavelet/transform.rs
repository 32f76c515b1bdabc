// The fixed 4-tap step and the general filter-bank step follow the periodic
// wavelet routines of Numerical Recipes (daub4, pwt, wt1), reindexed from 0.

use super::filter::FilterBank;
use super::FilterChoice;
use crate::core::{SynthError, SynthResult};
use tracing::debug;

const C0: f32 = 0.482_962_913_144_534_1;
const C1: f32 = 0.836_516_303_737_807_9;
const C2: f32 = 0.224_143_868_042_013_4;
const C3: f32 = -0.129_409_522_551_260_4;

/// Direction of a transform pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Samples to wavelet coefficients
    Forward,
    /// Wavelet coefficients back to samples
    Inverse,
}

/// Step kernel applied at each level of the pyramid
#[derive(Debug, Clone, PartialEq)]
pub enum Wavelet {
    /// Closed-form Daubechies 4-tap step with hand-unrolled wraparound
    Daub4,
    /// Convolution with an arbitrary filter bank over circular indices
    Bank(FilterBank),
}

impl Wavelet {
    /// Build the step kernel for a configured filter choice
    pub fn from_choice(choice: FilterChoice) -> SynthResult<Self> {
        match choice {
            FilterChoice::Daub4 => Ok(Wavelet::Daub4),
            FilterChoice::FilterBank { taps } => Ok(Wavelet::Bank(FilterBank::new(taps)?)),
        }
    }

    /// Tap count of the underlying filter
    pub fn taps(&self) -> usize {
        match self {
            Wavelet::Daub4 => 4,
            Wavelet::Bank(bank) => bank.taps(),
        }
    }

    /// Full forward pyramid transform, in place
    pub fn forward(&self, data: &mut [f32]) -> SynthResult<()> {
        self.transform(data, Direction::Forward)
    }

    /// Full inverse pyramid transform, in place
    pub fn inverse(&self, data: &mut [f32]) -> SynthResult<()> {
        self.transform(data, Direction::Inverse)
    }

    /// Pyramid driver.
    ///
    /// Forward halves the active prefix from `n` down to 2, each step leaving
    /// `len/2` smooth coefficients followed by `len/2` details. Inverse runs
    /// the transposed steps from 2 back up to `n`. Buffers shorter than two
    /// samples are left untouched.
    pub fn transform(&self, data: &mut [f32], direction: Direction) -> SynthResult<()> {
        let n = data.len();
        if n < 2 {
            return Ok(());
        }
        if !n.is_power_of_two() {
            return Err(SynthError::InvalidBufferSize { len: n });
        }

        // One scratch buffer sized for the widest step, reserved before the
        // data is touched so an allocation failure leaves it unmodified.
        let mut scratch = scratch_buffer(n)?;

        match direction {
            Direction::Forward => {
                let mut len = n;
                while len >= 2 {
                    self.step_into(&mut data[..len], &mut scratch[..len], direction);
                    len >>= 1;
                }
            }
            Direction::Inverse => {
                let mut len = 2;
                while len <= n {
                    self.step_into(&mut data[..len], &mut scratch[..len], direction);
                    len <<= 1;
                }
            }
        }

        debug!(len = n, taps = self.taps(), ?direction, "wavelet pyramid done");
        Ok(())
    }

    /// Single pyramid level over the whole of `data`.
    ///
    /// Allocates a scratch buffer of `data.len()` for the duration of the
    /// call.
    pub fn step(&self, data: &mut [f32], direction: Direction) -> SynthResult<()> {
        let n = data.len();
        if n < 2 {
            return Ok(());
        }
        if !n.is_power_of_two() {
            return Err(SynthError::InvalidBufferSize { len: n });
        }
        let mut scratch = scratch_buffer(n)?;
        self.step_into(data, &mut scratch, direction);
        Ok(())
    }

    fn step_into(&self, data: &mut [f32], scratch: &mut [f32], direction: Direction) {
        match self {
            Wavelet::Daub4 => daub4_step(data, scratch, direction),
            Wavelet::Bank(bank) => bank_step(bank, data, scratch, direction),
        }
        data.copy_from_slice(scratch);
    }
}

fn scratch_buffer(len: usize) -> SynthResult<Vec<f32>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| SynthError::AllocationFailure { len })?;
    buf.resize(len, 0.0);
    Ok(buf)
}

/// Daubechies 4-coefficient step; `a.len()` is a power of two >= 2
fn daub4_step(a: &[f32], wksp: &mut [f32], direction: Direction) {
    let n = a.len();
    let nh = n >> 1;

    match direction {
        Direction::Forward => {
            let mut i = 0;
            for j in (0..n - 2).step_by(2) {
                wksp[i] = C0 * a[j] + C1 * a[j + 1] + C2 * a[j + 2] + C3 * a[j + 3];
                wksp[i + nh] = C3 * a[j] - C2 * a[j + 1] + C1 * a[j + 2] - C0 * a[j + 3];
                i += 1;
            }
            // last pair wraps around to the start
            wksp[i] = C0 * a[n - 2] + C1 * a[n - 1] + C2 * a[0] + C3 * a[1];
            wksp[i + nh] = C3 * a[n - 2] - C2 * a[n - 1] + C1 * a[0] - C0 * a[1];
        }
        Direction::Inverse => {
            // first pair wraps around to the end
            wksp[0] = C2 * a[nh - 1] + C1 * a[n - 1] + C0 * a[0] + C3 * a[nh];
            wksp[1] = C3 * a[nh - 1] - C0 * a[n - 1] + C1 * a[0] - C2 * a[nh];
            let mut j = 2;
            for i in 0..nh - 1 {
                wksp[j] = C2 * a[i] + C1 * a[i + nh] + C0 * a[i + 1] + C3 * a[i + nh + 1];
                wksp[j + 1] = C3 * a[i] - C0 * a[i + nh] + C1 * a[i + 1] - C2 * a[i + nh + 1];
                j += 2;
            }
        }
    }
}

/// General filter-bank step with periodic boundaries
fn bank_step(bank: &FilterBank, a: &[f32], wksp: &mut [f32], direction: Direction) {
    let n = a.len();
    let nh = n >> 1;
    // zero mod n and larger than any negative offset, so indices never underflow
    let nmod = bank.taps() * n;
    // n is a power of two
    let mask = n - 1;
    let cc = bank.forward_taps();
    let cr = bank.reverse_taps();

    wksp.fill(0.0);

    for ii in 0..nh {
        let base = (2 * ii + 2 + nmod) as isize;
        let ni = (base + bank.forward_offset()) as usize;
        let nj = (base + bank.reverse_offset()) as usize;

        match direction {
            Direction::Forward => {
                for k in 0..cc.len() {
                    let jf = (ni + k) & mask;
                    let jr = (nj + k) & mask;
                    wksp[ii] += cc[k] * a[jf];
                    wksp[ii + nh] += cr[k] * a[jr];
                }
            }
            Direction::Inverse => {
                let ai = a[ii];
                let ai1 = a[ii + nh];
                for k in 0..cc.len() {
                    let jf = (ni + k) & mask;
                    let jr = (nj + k) & mask;
                    wksp[jf] += cc[k] * ai;
                    wksp[jr] += cr[k] * ai1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sample_daub4_is_orthonormal() {
        let mut data = [0.3f32, -0.7];
        Wavelet::Daub4.forward(&mut data).unwrap();
        let energy = data[0] * data[0] + data[1] * data[1];
        assert!((energy - (0.09 + 0.49)).abs() < 1e-6);
        Wavelet::Daub4.inverse(&mut data).unwrap();
        assert!((data[0] - 0.3).abs() < 1e-6);
        assert!((data[1] + 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_step_rejects_odd_length() {
        let mut data = [1.0f32; 6];
        assert_eq!(
            Wavelet::Daub4.step(&mut data, Direction::Forward),
            Err(SynthError::InvalidBufferSize { len: 6 })
        );
        assert_eq!(data, [1.0f32; 6]);
    }
}
