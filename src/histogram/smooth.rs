/// Kernel half-width in standard deviations.
pub const TRUNCATE: f64 = 4.0;

/// Upper bound on the kernel half-width, in samples.
pub const MAX_KERNEL_RADIUS: usize = 1 << 16;

/// Kernel half-width for `sigma`: `floor(4σ + 0.5)`, capped at
/// [`MAX_KERNEL_RADIUS`].
pub fn kernel_radius(sigma: f64) -> usize {
    let radius = TRUNCATE * sigma + 0.5;
    if radius.is_nan() || radius < 1.0 {
        0
    } else {
        radius.min(MAX_KERNEL_RADIUS as f64) as usize
    }
}

/// Normalised Gaussian kernel of radius [`kernel_radius`].
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = kernel_radius(sigma);
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let offset = i as f64 - radius as f64;
            (-offset * offset / denom).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Half-sample symmetric reflection (`d c b a | a b c d | d c b a`).
fn reflect(index: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let i = index.rem_euclid(period);
    if i < len as isize {
        i as usize
    } else {
        (period - 1 - i) as usize
    }
}

/// Convolve `values` with a Gaussian of `sigma` samples.
///
/// `sigma <= 0` or a non-finite sigma returns the input unchanged.
pub fn gaussian_smooth(values: &[f64], sigma: f64) -> Vec<f64> {
    if values.is_empty() || !sigma.is_finite() || sigma <= 0.0 {
        return values.to_vec();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let len = values.len();

    (0..len as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(j, w)| w * values[reflect(i + j as isize - radius, len)])
                .sum()
        })
        .collect()
}
