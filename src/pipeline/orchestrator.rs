use super::core::{AnalysisResult, AnalysisStage};
use super::progress::{NoopProgress, ProgressEvent, ProgressReporter};
use super::stage_timings::StageTimings;
use crate::analysis::{BleachingEstimator, Enhancer, MorphologyClassifier};
use crate::common::coral_image::{display_name, CoralImage};
use crate::config::Settings;
use crate::error::AppError;
use crate::species::{SpeciesCatalog, SpeciesResolver};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Runs the four stages over one photograph in a fixed order.
///
/// Morphology and bleaching both read the original pixels; the enhanced copy
/// is only attached to the result for display and export.
pub struct CoralAnalysisOrchestrator {
    enhancer: Enhancer,
    classifier: MorphologyClassifier,
    estimator: BleachingEstimator,
    resolver: SpeciesResolver,
    progress: Arc<dyn ProgressReporter>,
}

impl CoralAnalysisOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new(Settings::default())
    }

    pub fn enhancer(&self) -> &Enhancer {
        &self.enhancer
    }

    #[instrument(skip_all, fields(image = %image.filename()))]
    pub fn analyze(&self, image: &CoralImage) -> AnalysisResult {
        let analysis_start = Instant::now();
        let mut timings = StageTimings::new();
        let pixels = image.image();

        let enhanced = self.run_stage(AnalysisStage::Enhance, &mut timings, || {
            self.enhancer.enhance(pixels)
        });
        let morphology = self.run_stage(AnalysisStage::Morphology, &mut timings, || {
            self.classifier.analyze(pixels)
        });
        let bleaching = self.run_stage(AnalysisStage::Bleaching, &mut timings, || {
            self.estimator.estimate(pixels)
        });
        let species = self.run_stage(AnalysisStage::Species, &mut timings, || {
            self.resolver.identify(&morphology.morphology.descriptor())
        });

        info!(
            "Analysis of {} completed in {}us: {} / {} ({:.1}%)",
            image.filename(),
            analysis_start.elapsed().as_micros(),
            morphology.morphology,
            bleaching.health_status,
            bleaching.bleaching_percentage
        );

        AnalysisResult {
            id: image.id(),
            filename: image.filename().to_string(),
            analyzed_at: image.loaded_at(),
            dimensions: Some(image.dimensions()),
            enhanced: Some(enhanced),
            morphology,
            bleaching,
            species,
            timings,
        }
    }

    /// Load and analyze; an unreadable file yields [`AnalysisResult::unreadable`].
    pub fn analyze_path(&self, path: &Path) -> AnalysisResult {
        match CoralImage::open(path) {
            Ok(image) => self.analyze(&image),
            Err(e) => {
                warn!("{}", e);
                AnalysisResult::unreadable(display_name(path))
            }
        }
    }

    fn run_stage<T>(
        &self,
        stage: AnalysisStage,
        timings: &mut StageTimings,
        step: impl FnOnce() -> T,
    ) -> T {
        self.progress.report(ProgressEvent::Started {
            stage,
            step: stage.step(),
            total: AnalysisStage::ALL.len(),
        });
        let start = Instant::now();
        let output = step();
        let elapsed = start.elapsed();
        timings.record(stage, elapsed);
        self.progress.report(ProgressEvent::Finished { stage, elapsed });
        output
    }
}

pub struct OrchestratorBuilder {
    settings: Settings,
    catalog: Option<Arc<SpeciesCatalog>>,
    progress: Option<Arc<dyn ProgressReporter>>,
}

impl OrchestratorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            catalog: None,
            progress: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    // Defaults to the reference catalog.
    pub fn catalog(mut self, catalog: Arc<SpeciesCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn progress(mut self, progress: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn build(self) -> Result<CoralAnalysisOrchestrator, AppError> {
        self.settings.validate()?;

        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(SpeciesCatalog::reference()));
        if catalog.is_empty() {
            return Err(AppError::Config("Species catalog is empty".to_string()));
        }

        Ok(CoralAnalysisOrchestrator {
            enhancer: Enhancer::new(self.settings.enhancement.clone()),
            classifier: MorphologyClassifier::new(self.settings.morphology.clone()),
            estimator: BleachingEstimator::new(self.settings.bleaching.clone()),
            resolver: SpeciesResolver::new(catalog),
            progress: self.progress.unwrap_or_else(|| Arc::new(NoopProgress)),
        })
    }
}
