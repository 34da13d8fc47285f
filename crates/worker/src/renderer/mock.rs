use std::time::Duration;

use super::{RenderError, RenderRequest, Renderer};

/// Stand-in renderer for environments without Manim.
///
/// Waits `delay`, then writes an empty file at the output path.
#[derive(Debug, Clone)]
pub struct MockRenderer {
    delay: Duration,
}

impl MockRenderer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Renderer for MockRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        tokio::time::sleep(self.delay).await;
        if let Some(parent) = request.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&request.output_path, b"").await?;
        tracing::info!(output = %request.output_path.display(), "Mock render finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use manim_core::job::RenderQuality;

    use super::*;

    #[tokio::test]
    async fn writes_empty_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let request = RenderRequest {
            script_path: tmp.path().join("scene.py"),
            scene_class: "GeneratedScene",
            quality: RenderQuality::Low,
            output_path: tmp.path().join("videos").join("manim-1.mp4"),
            working_dir: tmp.path().to_path_buf(),
        };

        MockRenderer::new(Duration::ZERO).render(&request).await.unwrap();

        let meta = std::fs::metadata(&request.output_path).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len(), 0);
    }
}
