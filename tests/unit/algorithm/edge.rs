//! Tests for pairwise edge registration including symmetry, caching and outlier rejection

#[cfg(test)]
mod tests {
    use crate::{TILE, displaced_grid, nominal_tiles};
    use ndarray::s;
    use tilestitch::StitchError;
    use tilestitch::algorithm::edge::EdgeAligner;
    use tilestitch::filter::Laplace;
    use tilestitch::io::configuration::RegistrationConfig;
    use tilestitch::io::memory::InMemoryTiles;
    use tilestitch::io::source::ImageSource;
    use tilestitch::spatial::TileSet;

    const OFFSETS: [[f64; 2]; 4] = [[0.0, 0.0], [0.4, 0.0], [0.0, -0.7], [0.4, -0.7]];

    fn assert_close(actual: [f64; 2], expected: [f64; 2], tolerance: f64) {
        assert!(
            (actual[0] - expected[0]).abs() < tolerance
                && (actual[1] - expected[1]).abs() < tolerance,
            "shift {actual:?} differs from {expected:?} by more than {tolerance}"
        );
    }

    // Tests every edge pair recovers the relative content displacement
    // Verified by dropping the sub-pixel refinement step
    #[test]
    fn test_register_recovers_edge_shifts() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let mut aligner = EdgeAligner::new(&source, &tiles);

        for (first, second, expected) in [
            (0, 1, [0.4, 0.0]),
            (0, 2, [0.0, -0.7]),
            (1, 3, [0.0, -0.7]),
            (2, 3, [0.4, 0.0]),
        ] {
            let result = aligner.register(first, second).unwrap();
            assert_close(result.shift, expected, 0.15);
            assert!(result.error < 0.2, "pair ({first}, {second}) error {}", result.error);
        }
    }

    // Tests shifts across the narrow axis of an overlap strip are not shrunk
    // Verified by limiting registration to a single correlation pass
    #[test]
    fn test_register_recovers_shift_across_strip() {
        let tiles = nominal_tiles();
        for expected in [[0.4, 0.0], [0.7, 0.0], [1.25, -0.35]] {
            let source = displaced_grid([[0.0, 0.0], [0.0, 0.0], expected, [0.0, 0.0]]);
            let mut aligner = EdgeAligner::new(&source, &tiles);

            let result = aligner.register(0, 2).unwrap();
            assert_close(result.shift, expected, 0.2);
            assert!(result.error < 0.2, "shift {expected:?} error {}", result.error);
            assert_eq!(source.read_count(), 2);
        }
    }

    // Tests reversed pair order negates the shift and keeps the error
    // Verified by returning cached results without reversal
    #[test]
    fn test_register_is_antisymmetric() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let mut aligner = EdgeAligner::new(&source, &tiles);

        let forward = aligner.register(0, 2).unwrap();
        let backward = aligner.register(2, 0).unwrap();

        assert_eq!(backward.shift, [-forward.shift[0], -forward.shift[1]]);
        assert_eq!(backward.error, forward.error);
    }

    // Tests repeated registrations are served from the cache without reads
    // Verified by bypassing the cache lookup
    #[test]
    fn test_register_reads_each_pair_once() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let mut aligner = EdgeAligner::new(&source, &tiles);

        let first = aligner.register(0, 1).unwrap();
        assert_eq!(source.read_count(), 2);

        let again = aligner.register(0, 1).unwrap();
        let _ = aligner.register(1, 0).unwrap();

        assert_eq!(first, again);
        assert_eq!(source.read_count(), 2);
        assert_eq!(aligner.cache().len(), 1);
        assert_eq!(aligner.cache().stats.misses, 1);
        assert_eq!(aligner.cache().stats.hits, 2);
    }

    // Tests shifts beyond the limit collapse to zero shift with error 1
    // Verified by comparing the limit against the signed shift
    #[test]
    fn test_outlier_rejection() {
        let source = displaced_grid([[0.0, 0.0], [-1.3, 0.0], [0.0, 0.6], [-1.3, 0.6]]);
        let tiles = nominal_tiles();
        let config = RegistrationConfig {
            max_shift_fraction: 0.01,
            ..RegistrationConfig::default()
        };
        let mut aligner = EdgeAligner::with_whitening(&source, &tiles, config, Laplace).unwrap();
        assert_eq!(aligner.max_shift(), [1.0, 1.0]);

        let rejected = aligner.register(0, 1).unwrap();
        assert_eq!(rejected.shift, [0.0, 0.0]);
        assert_eq!(rejected.error, 1.0);
        assert!(rejected.is_rejected());

        let accepted = aligner.register(0, 2).unwrap();
        assert!(!accepted.is_rejected());
        assert_close(accepted.shift, [0.0, 0.6], 0.15);
    }

    // Tests disjoint tiles fail without touching the cache or the source
    // Verified by caching a rejected result for disjoint pairs
    #[test]
    fn test_register_disjoint_tiles() {
        let mut source = InMemoryTiles::new([1.0, 1.0]);
        source.push_tile([0.0, 0.0], crate::scene_window([0.0, 0.0], [TILE, TILE]));
        source.push_tile([0.0, 200.0], crate::scene_window([0.0, 200.0], [TILE, TILE]));
        let tiles = TileSet::from_metadata(&source).unwrap();
        let mut aligner = EdgeAligner::new(&source, &tiles);

        let result = aligner.register(0, 1);

        assert!(matches!(result, Err(StitchError::Geometry { .. })));
        assert!(aligner.cache().is_empty());
        assert_eq!(source.read_count(), 0);
    }

    // Tests out-of-range tiles are reported by index
    // Verified by clamping tile indices into range
    #[test]
    fn test_register_invalid_tile() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let mut aligner = EdgeAligner::new(&source, &tiles);

        assert!(matches!(
            aligner.register(0, 7),
            Err(StitchError::InvalidTileIndex { index: 7, .. })
        ));
    }

    // Tests the overlap of horizontal neighbours in both tile frames
    // Verified by swapping the per-tile offsets
    #[test]
    fn test_intersection_of_neighbours() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let aligner = EdgeAligner::new(&source, &tiles);

        let region = aligner.intersection(0, 1).unwrap();
        assert_eq!(region.offset1, [0.0, -90.0]);
        assert_eq!(region.offset2, [0.0, 0.0]);
        assert_eq!(region.shape, [100, 10]);
    }

    // Tests crops are shifted, truncated and clamped tile content
    // Verified by cropping before shifting
    #[test]
    fn test_crop_matches_tile_content() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let aligner = EdgeAligner::new(&source, &tiles);
        let tile = source.read(0, 0).unwrap();

        let crop = aligner.crop(0, [0.0, -90.0], [100, 10]).unwrap();

        assert_eq!(crop.dim(), (100, 10));
        assert_eq!(crop, tile.slice(s![.., 90..]));
        assert!(crop.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    // Tests overlap crops of neighbours share a shape
    // Verified by using the tile size as crop shape
    #[test]
    fn test_overlap_crops() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let aligner = EdgeAligner::new(&source, &tiles);

        let (first, second) = aligner.overlap(2, 3).unwrap();
        assert_eq!(first.dim(), (100, 10));
        assert_eq!(second.dim(), (100, 10));
    }

    // Tests inspection exposes crops, whitened crops and the correlation surface
    // Verified by returning the unshifted surface dimensions transposed
    #[test]
    fn test_inspect_pair() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let aligner = EdgeAligner::new(&source, &tiles);

        let inspection = aligner.inspect(0, 1).unwrap();

        assert_eq!(inspection.overlap.0.dim(), (100, 10));
        assert_eq!(inspection.whitened.1.dim(), (100, 10));
        assert_eq!(inspection.surface.magnitude.dim(), (100, 10));
        assert_close(inspection.surface.estimate.shift, [0.4, 0.0], 0.15);
        assert!(aligner.cache().is_empty());
    }

    // Tests invalid settings are refused at construction
    // Verified by skipping configuration validation
    #[test]
    fn test_with_whitening_validates_config() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();
        let config = RegistrationConfig {
            upsample_factor: 0,
            ..RegistrationConfig::default()
        };

        let result = EdgeAligner::with_whitening(&source, &tiles, config, Laplace);
        assert!(matches!(result, Err(StitchError::InvalidParameter { .. })));
    }

    // Tests results from a worker aligner are reused after merging
    // Verified by discarding entries during merge
    #[test]
    fn test_merge_cache_from_worker() {
        let source = displaced_grid(OFFSETS);
        let tiles = nominal_tiles();

        let mut worker = EdgeAligner::new(&source, &tiles);
        let computed = worker.register(1, 3).unwrap();
        let cache = worker.into_cache();
        source.reset_read_count();

        let mut aligner = EdgeAligner::new(&source, &tiles);
        aligner.merge_cache(cache);

        assert_eq!(aligner.register(1, 3).unwrap(), computed);
        assert_eq!(source.read_count(), 0);
    }
}
