//! Tests for the in-memory tile source including channel access and read counting

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use tilestitch::StitchError;
    use tilestitch::io::memory::InMemoryTiles;
    use tilestitch::io::source::{ImageSource, MetadataSource};

    // Tests tiles report their geometry through the metadata trait
    // Verified by reporting width before height
    #[test]
    fn test_metadata() {
        let mut tiles = InMemoryTiles::new([0.5, 0.25]);
        assert_eq!(tiles.push_tile([1.0, 2.0], Array2::zeros((3, 5))), 0);
        assert_eq!(tiles.push_tile([4.0, 8.0], Array2::zeros((3, 5))), 1);

        assert_eq!(tiles.tile_count(), 2);
        assert_eq!(tiles.pixel_size(1).unwrap(), [3, 5]);
        assert_eq!(tiles.pixel_calibration(), [0.5, 0.25]);
        assert_eq!(tiles.stage_position(1).unwrap(), [4.0, 8.0]);
        assert!(matches!(
            tiles.stage_position(2),
            Err(StitchError::InvalidTileIndex { index: 2, .. })
        ));
    }

    // Tests reads return the stored plane and are counted
    // Verified by counting failed reads too
    #[test]
    fn test_read_counts() {
        let mut tiles = InMemoryTiles::new([1.0, 1.0]);
        let plane = Array2::from_elem((2, 2), 0.25);
        tiles.push_tile([0.0, 0.0], plane.clone());

        assert_eq!(tiles.read(0, 0).unwrap(), plane);
        assert!(tiles.read(0, 1).is_err());
        assert!(tiles.read(3, 0).is_err());
        assert_eq!(tiles.read_count(), 1);

        tiles.reset_read_count();
        assert_eq!(tiles.read_count(), 0);
    }

    // Tests multi-channel tiles expose each channel
    // Verified by always returning the first channel
    #[test]
    fn test_push_channels() {
        let mut tiles = InMemoryTiles::new([1.0, 1.0]);
        let index = tiles
            .push_channels(
                [0.0, 0.0],
                vec![Array2::zeros((2, 2)), Array2::from_elem((2, 2), 1.0)],
            )
            .unwrap();

        assert_eq!(index, 0);
        assert_eq!(tiles.read(0, 1).unwrap()[[1, 1]], 1.0);
        assert!(matches!(
            tiles.read(0, 2),
            Err(StitchError::InvalidParameter { parameter: "channel", .. })
        ));
    }

    // Tests channel sets must be non-empty and uniformly shaped
    // Verified by accepting the first channel's shape only
    #[test]
    fn test_push_channels_validation() {
        let mut tiles = InMemoryTiles::new([1.0, 1.0]);
        assert!(tiles.push_channels([0.0, 0.0], Vec::new()).is_err());
        assert!(
            tiles
                .push_channels(
                    [0.0, 0.0],
                    vec![Array2::zeros((2, 2)), Array2::zeros((2, 3))]
                )
                .is_err()
        );
        assert_eq!(tiles.tile_count(), 0);
    }
}
