//! Tests for stage progress bookkeeping

#[cfg(test)]
mod tests {
    use tilestitch::io::progress::ProgressManager;

    // Tests stages get sequential handles and count steps
    // Verified by sharing one bar between stages
    #[test]
    fn test_stage_progress() {
        let mut manager = ProgressManager::new();
        let pairs = manager.start_stage("pairs", 4);
        let layer = manager.start_stage("layer 1", 2);

        manager.advance(pairs, "0-1");
        manager.advance(pairs, "0-2");
        manager.advance(layer, "tile 0");

        assert_eq!((pairs, layer), (0, 1));
        assert_eq!(manager.position(pairs), Some(2));
        assert_eq!(manager.position(layer), Some(1));

        manager.finish_stage(pairs);
        manager.finish();
    }

    // Tests unknown stage handles are ignored
    // Verified by indexing stages directly
    #[test]
    fn test_unknown_stage() {
        let manager = ProgressManager::default();
        manager.advance(3, "ignored");
        manager.finish_stage(3);
        assert_eq!(manager.position(3), None);
    }
}
