//! End-to-end model extraction.
//!
//! text -> prompt -> model client -> raw text -> extractor -> normalizer -> [`TrussModel`]

use truss_core::{
    check_references, normalize, synthesize, Config, PlanarMesh, StructuralMesh, TrussModel,
};

use crate::client::ModelClient;
use crate::extract::extract;
use crate::prompt::build_prompt;
use crate::provider::{FailureCategory, LLMError, Result};
use crate::provider_factory::create_client;

pub struct TrussPipeline {
    client: ModelClient,
}

impl TrussPipeline {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(create_client(config))
    }

    /// Run the language-model path. Transport and parse failures propagate as distinct
    /// categories; normalization itself never fails.
    pub async fn parse(&self, description: &str) -> Result<TrussModel> {
        if description.trim().is_empty() {
            return Err(LLMError::EmptyDescription);
        }

        let instruction = build_prompt(description);
        let raw = self.client.query(&instruction).await?;
        let document = extract(&raw)?;
        let model = normalize(&document);

        log::info!(
            "Extracted truss: {} nodes, {} elements, {} supports, {} loads",
            model.nodes.len(),
            model.elements.len(),
            model.supports.len(),
            model.loads.len()
        );

        if model.is_empty() {
            log::warn!("Model has no nodes or elements");
        }

        let report = check_references(&model);
        if !report.is_clean() {
            log::warn!(
                "Model has {} dangling reference(s) and {} duplicate node id(s)",
                report.dangling.len(),
                report.duplicate_node_ids.len()
            );
        }

        Ok(model)
    }

    /// The deterministic path; never touches the service.
    pub fn synthesize(&self, description: &str) -> PlanarMesh {
        synthesize(description)
    }

    /// Language-model path first; when the service itself is down or times out, fall back to
    /// the synthesizer. The result is tagged so the caller can see which path answered.
    /// Parse failures still propagate.
    pub async fn parse_or_synthesize(&self, description: &str) -> Result<StructuralMesh> {
        match self.parse(description).await {
            Ok(model) => Ok(StructuralMesh::Canonical(model)),
            Err(e)
                if matches!(
                    e.category(),
                    FailureCategory::ServiceDegraded | FailureCategory::UpstreamTimeout
                ) =>
            {
                log::warn!("Generation service failed ({}), synthesizing geometry instead", e);
                Ok(StructuralMesh::Positional(self.synthesize(description)))
            }
            Err(e) => Err(e),
        }
    }
}
