/// Hands out consecutive windows of a sample buffer
#[derive(Debug, Clone)]
pub struct WindowReader<'a> {
    samples: &'a [f32],
    position: usize,
    window_len: usize,
}

impl<'a> WindowReader<'a> {
    pub fn new(samples: &'a [f32], window_len: usize) -> Self {
        Self {
            samples,
            position: 0,
            window_len,
        }
    }

    /// Copy the next window into `dest`.
    ///
    /// Returns the number of samples written, at most
    /// `min(dest.len(), window_len)`. Zero means the input is exhausted.
    pub fn read_window(&mut self, dest: &mut [f32]) -> usize {
        let count = self
            .window_len
            .min(dest.len())
            .min(self.samples.len() - self.position);
        dest[..count].copy_from_slice(&self.samples[self.position..self.position + count]);
        self.position += count;
        count
    }

    /// Samples consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }
}
