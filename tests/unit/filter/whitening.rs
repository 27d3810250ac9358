//! Tests for whitening filters and boundary reflection

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use tilestitch::filter::whitening::{GaussianHighPass, Laplace, Whitening, reflect_index};

    // Tests the Laplacian responds only to curvature
    // Verified by using a negative centre tap
    #[test]
    fn test_laplace_impulse() {
        let mut image = Array2::<f64>::zeros((5, 5));
        image[[2, 2]] = 1.0;

        let whitened = Laplace.whiten(image.view());

        assert_eq!(whitened[[2, 2]], 4.0);
        assert_eq!(whitened[[1, 2]], -1.0);
        assert_eq!(whitened[[2, 3]], -1.0);
        assert_eq!(whitened[[1, 1]], 0.0);
        assert!(whitened.sum().abs() < 1e-12);
    }

    // Tests constant images whiten to zero including the borders
    // Verified by padding with zeros instead of reflecting
    #[test]
    fn test_laplace_constant() {
        let image = Array2::from_elem((4, 6), 0.7);
        let whitened = Laplace.whiten(image.view());
        assert!(whitened.iter().all(|v| v.abs() < 1e-12));
    }

    // Tests interior samples of a linear ramp whiten to zero
    // Verified by dropping one neighbour from the stencil
    #[test]
    fn test_laplace_ramp_interior() {
        let image = Array2::from_shape_fn((5, 5), |(r, c)| 0.1 * r as f64 + 0.05 * c as f64);
        let whitened = Laplace.whiten(image.view());
        assert!(whitened[[2, 2]].abs() < 1e-12);
        assert!(whitened[[1, 3]].abs() < 1e-12);
    }

    // Tests the high-pass removes constant offsets and keeps the shape
    // Verified by returning the blurred copy
    #[test]
    fn test_gaussian_high_pass_constant() {
        let image = Array2::from_elem((9, 7), 0.4);
        let whitened = GaussianHighPass::default().whiten(image.view());

        assert_eq!(whitened.dim(), (9, 7));
        assert!(whitened.iter().all(|v| v.abs() < 1e-12));
    }

    // Tests the high-pass keeps most of an isolated peak
    // Verified by subtracting the image from its blur
    #[test]
    fn test_gaussian_high_pass_impulse() {
        let mut image = Array2::<f64>::zeros((21, 21));
        image[[10, 10]] = 1.0;

        let whitened = GaussianHighPass { sigma: 2.0 }.whiten(image.view());

        assert!(whitened[[10, 10]] > 0.9);
        assert!(whitened[[10, 12]] < 0.0);
        assert!(whitened.sum().abs() < 1e-9);
    }

    // Tests non-positive sigma leaves nothing after subtraction
    // Verified by building a kernel from a zero sigma
    #[test]
    fn test_gaussian_high_pass_degenerate_sigma() {
        let image = array![[0.2, 0.8], [0.5, 0.1]];
        let whitened = GaussianHighPass { sigma: 0.0 }.whiten(image.view());
        assert!(whitened.iter().all(|v| v.abs() < 1e-12));
    }

    // Tests half-sample reflection of out-of-range indices
    // Verified by reflecting about the edge sample
    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(2, 4), 2);
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(3, 0), 0);
    }
}
