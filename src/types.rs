/// Counters collected while generating annotations
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub images: usize,
    pub annotations: usize,
    pub resized_masks: usize,
    pub skipped_empty_instances: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_images(&mut self) {
        self.images += 1;
    }

    pub fn increment_annotations(&mut self) {
        self.annotations += 1;
    }

    pub fn increment_resized(&mut self) {
        self.resized_masks += 1;
    }

    pub fn increment_skipped_empty(&mut self) {
        self.skipped_empty_instances += 1;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Images: {}", self.images);
        log::info!("Annotations: {}", self.annotations);
        if self.resized_masks > 0 {
            log::warn!(
                "Masks with a size different from their frame: {}",
                self.resized_masks
            );
        }
        if self.skipped_empty_instances > 0 {
            log::warn!(
                "Instances skipped as empty after resampling: {}",
                self.skipped_empty_instances
            );
        }
    }
}
