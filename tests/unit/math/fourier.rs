//! Tests for two-dimensional transforms, frequency bins and quadrant swapping

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use rustfft::num_complex::Complex;
    use tilestitch::math::fourier::{fft_shift, forward, frequency, inverse};

    // Tests a unit impulse at the origin has a flat spectrum
    // Verified by transforming rows only
    #[test]
    fn test_forward_impulse() {
        let mut plane = Array2::<f64>::zeros((4, 6));
        plane[[0, 0]] = 1.0;

        let spectrum = forward(plane.view()).unwrap();

        assert!(
            spectrum
                .iter()
                .all(|v| (v - Complex::new(1.0, 0.0)).norm() < 1e-12)
        );
    }

    // Tests the inverse is unnormalized
    // Verified by dividing by the sample count in the inverse
    #[test]
    fn test_round_trip_scales_by_length() {
        let plane = array![[0.5, 1.0, 0.0], [2.0, -1.0, 0.25]];

        let restored = inverse(forward(plane.view()).unwrap().view()).unwrap();

        for (value, original) in restored.iter().zip(plane.iter()) {
            assert!((value.re - 6.0 * original).abs() < 1e-9);
            assert!(value.im.abs() < 1e-9);
        }
    }

    // Tests transposed views transform like their standard-layout copies
    // Verified by skipping the layout normalization
    #[test]
    fn test_forward_transposed_view() {
        let plane = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let from_view = forward(plane.t()).unwrap();
        let from_copy = forward(plane.t().to_owned().view()).unwrap();

        assert_eq!(from_view.dim(), (3, 2));
        for (a, b) in from_view.iter().zip(from_copy.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    // Tests empty planes pass through
    // Verified by planning zero-length transforms
    #[test]
    fn test_forward_empty() {
        let plane = Array2::<f64>::zeros((0, 3));
        assert_eq!(forward(plane.view()).unwrap().dim(), (0, 3));
    }

    // Tests signed bin frequencies for even and odd lengths
    // Verified by wrapping at the midpoint for odd lengths too
    #[test]
    fn test_frequency_bins() {
        let even: Vec<f64> = (0..4).map(|i| frequency(i, 4)).collect();
        assert_eq!(even, vec![0.0, 0.25, -0.5, -0.25]);

        let odd: Vec<f64> = (0..5).map(|i| frequency(i, 5)).collect();
        assert_eq!(odd, vec![0.0, 0.2, 0.4, -0.4, -0.2]);
    }

    // Tests quadrant swapping moves the origin to the center
    // Verified by shifting by half the length rounded up
    #[test]
    fn test_fft_shift() {
        let even = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(fft_shift(even.view()), array![[4.0, 3.0], [2.0, 1.0]]);

        let odd = array![[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        assert_eq!(fft_shift(odd.view())[[1, 1]], 1.0);
    }
}
