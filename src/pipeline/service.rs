use super::core::AnalysisResult;
use super::orchestrator::CoralAnalysisOrchestrator;
use crate::common::CoralImage;
use crate::error::AppError;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;

/// `tower` adapter running each analysis on the blocking pool.
#[derive(Clone)]
pub struct CoralAnalysisService {
    orchestrator: Arc<CoralAnalysisOrchestrator>,
}

impl CoralAnalysisService {
    pub fn new(orchestrator: Arc<CoralAnalysisOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

impl Service<CoralImage> for CoralAnalysisService {
    type Response = AnalysisResult;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image: CoralImage) -> Self::Future {
        let orchestrator = self.orchestrator.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || orchestrator.analyze(&image))
                .await
                .map_err(|e| AppError::Pipeline(format!("Analysis task failed: {}", e)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::{ChannelProgress, ProgressEvent};
    use image::{DynamicImage, ImageBuffer, Rgb};
    use tower::ServiceExt;

    fn pale_image(name: &str) -> CoralImage {
        let image = ImageBuffer::from_pixel(64, 48, Rgb([220, 220, 220]));
        CoralImage::new(name, DynamicImage::ImageRgb8(image))
    }

    #[tokio::test]
    async fn analyzes_through_service() {
        let orchestrator = CoralAnalysisOrchestrator::builder().build().unwrap();
        let service = CoralAnalysisService::new(Arc::new(orchestrator));

        let result = service.oneshot(pale_image("pale.png")).await.unwrap();

        assert_eq!(result.filename, "pale.png");
        assert_eq!(result.dimensions, Some((64, 48)));
        assert_eq!(result.bleaching.confidence, 95.0);
    }

    #[tokio::test]
    async fn streams_progress_over_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let orchestrator = CoralAnalysisOrchestrator::builder()
            .progress(ChannelProgress::new(tx))
            .build()
            .unwrap();
        let mut service = CoralAnalysisService::new(Arc::new(orchestrator));

        service
            .ready()
            .await
            .unwrap()
            .call(pale_image("a.png"))
            .await
            .unwrap();

        let mut started = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, ProgressEvent::Started { .. }) {
                started += 1;
            }
        }
        assert_eq!(started, 4);
    }
}
