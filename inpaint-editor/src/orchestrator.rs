//! Edit orchestration: package canvas, mask and prompt, submit, apply.

use std::sync::atomic::{AtomicBool, Ordering};

use inpaint_core::{EditRequest, EditorSession, ImageSource};
use inpaint_renderer::{
    image_source_from_bytes, image_source_from_data_uri, MaskCompositor, SceneRasterizer,
};

use crate::error::EditError;
use crate::transport::EditTransport;

/// Result of a submitted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The returned image replaced the canvas.
    Applied {
        /// Server message.
        message: String,
    },
    /// The server answered without an image; the canvas is unchanged.
    NoImage {
        /// Server message.
        message: String,
    },
}

impl EditOutcome {
    /// Server message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Applied { message } | Self::NoImage { message } => message,
        }
    }
}

/// Clears the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits edits for an [`EditorSession`], one at a time.
pub struct EditOrchestrator<T> {
    transport: T,
    rasterizer: SceneRasterizer,
    in_flight: AtomicBool,
}

impl<T: EditTransport> EditOrchestrator<T> {
    /// Create an orchestrator over `transport`.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            rasterizer: SceneRasterizer::with_defaults(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a request is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Build the request body for the current canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Render`] if the canvas or mask cannot be encoded.
    pub fn build_request(
        &self,
        session: &EditorSession,
        prompt: &str,
    ) -> Result<EditRequest, EditError> {
        let scene = session.scene();
        let image = self.rasterizer.render_data_uri(scene)?;
        let mask = MaskCompositor::new(session.surface().brush().size)
            .compose(scene)?
            .to_data_uri()?;
        Ok(EditRequest {
            image,
            mask,
            prompt: prompt.to_string(),
        })
    }

    /// Submit the canvas for editing and apply the result.
    ///
    /// On any error the canvas is left as it was.
    ///
    /// # Errors
    ///
    /// See [`EditError`]; `EmptyPrompt` and `Busy` are raised before any
    /// network traffic.
    #[tracing::instrument(name = "apply_edit", skip(self, session, prompt), fields(prompt_len = prompt.len()))]
    pub async fn apply_edit(
        &self,
        session: &mut EditorSession,
        prompt: &str,
    ) -> Result<EditOutcome, EditError> {
        if prompt.trim().is_empty() {
            return Err(EditError::EmptyPrompt);
        }
        let _guard = InFlight::acquire(&self.in_flight).ok_or(EditError::Busy)?;

        let request = self.build_request(session, prompt)?;
        tracing::debug!(
            image_len = request.image.len(),
            mask_len = request.mask.len(),
            "Submitting edit"
        );

        let response = self.transport.submit(&request).await.map_err(|err| {
            tracing::error!("Error editing image: {err}");
            EditError::Request(err)
        })?;

        let Some(edited) = response.edited_image else {
            tracing::info!(message = %response.message, "Edit returned no image");
            return Ok(EditOutcome::NoImage {
                message: response.message,
            });
        };

        let source = self.load_edited(&edited).await?;
        session.apply_edited_image(source)?;
        tracing::info!(message = %response.message, "Edit applied");

        Ok(EditOutcome::Applied {
            message: response.message,
        })
    }

    async fn load_edited(&self, edited: &str) -> Result<ImageSource, EditError> {
        if edited.starts_with("data:") {
            return image_source_from_data_uri(edited).map_err(EditError::InvalidImage);
        }
        let bytes = self
            .transport
            .fetch_image(edited)
            .await
            .map_err(EditError::Request)?;
        image_source_from_bytes(&bytes).map_err(EditError::InvalidImage)
    }
}
