// SPDX-License-Identifier: MIT

//! Workflow diagram export
//!
//! The graph is rendered to Mermaid source, then sent to a mermaid.ink
//! compatible service for a PNG. If that fails the Mermaid source is saved
//! as Markdown instead. Export is best effort and never affects a run.

use crate::adk::error::ExportError;
use crate::chain::config::DiagramConfig;
use crate::chain::graph::{ChainGraph, Edge, END, START};
use crate::chain::logging::banner;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// What ended up on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Png(PathBuf),
    Markdown(PathBuf),
}

/// Render the graph as a Mermaid flowchart
pub fn render_mermaid(graph: &ChainGraph) -> String {
    let mut output = String::new();

    output.push_str("%%{init: {'flowchart': {'curve': 'linear'}}}%%\n");
    output.push_str("graph TD\n");

    output.push_str(&format!("    {}((START))\n", sanitize_id(START)));
    output.push_str(&format!(
        "    style {} fill:#90EE90,stroke:#228B22,stroke-width:3px\n",
        sanitize_id(START)
    ));
    output.push_str(&format!("    {}((END))\n", sanitize_id(END)));
    output.push_str(&format!(
        "    style {} fill:#FFB6C1,stroke:#DC143C,stroke-width:3px\n",
        sanitize_id(END)
    ));

    let conditional = graph.conditional_nodes();
    for node in &graph.nodes {
        let id = sanitize_id(node);
        if conditional.contains(&node.as_str()) {
            output.push_str(&format!("    {}{{\"{}\"}}\n", id, escape_mermaid(node)));
            output.push_str(&format!(
                "    style {} fill:#FFE4B5,stroke:#FF8C00,stroke-width:2px\n",
                id
            ));
        } else {
            output.push_str(&format!("    {}[\"{}\"]\n", id, escape_mermaid(node)));
            output.push_str(&format!(
                "    style {} fill:#F0F0F0,stroke:#666,stroke-width:2px\n",
                id
            ));
        }
    }

    for edge in &graph.edges {
        match edge {
            Edge::Direct { from, to } => {
                output.push_str(&format!(
                    "    {} --> {}\n",
                    sanitize_id(from),
                    sanitize_id(to)
                ));
            }
            Edge::Conditional { from, branches } => {
                for (label, to) in branches {
                    output.push_str(&format!(
                        "    {} -.\"{}\".-> {}\n",
                        sanitize_id(from),
                        escape_mermaid(label),
                        sanitize_id(to)
                    ));
                }
            }
        }
    }

    output
}

/// Escape special characters for Mermaid labels
fn escape_mermaid(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Mermaid node ids must be alphanumeric + underscore
fn sanitize_id(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Writes the diagram to disk, PNG first, Markdown as fallback
pub struct DiagramExporter {
    client: Client,
    config: DiagramConfig,
}

impl DiagramExporter {
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Renderer URL for a given Mermaid source
    fn png_url(&self, mermaid: &str) -> String {
        format!(
            "{}/img/{}?type=png",
            self.config.renderer_url.trim_end_matches('/'),
            URL_SAFE.encode(mermaid.as_bytes())
        )
    }

    async fn fetch_png(&self, mermaid: &str) -> Result<Vec<u8>, ExportError> {
        let resp = self
            .client
            .get(self.png_url(mermaid))
            .timeout(RENDER_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ExportError::Render(format!("status {}: {}", status, text)));
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(ExportError::Render("empty image body".to_string()));
        }
        Ok(bytes.to_vec())
    }

    async fn write_png(&self, mermaid: &str) -> Result<Artifact, ExportError> {
        let png = self.fetch_png(mermaid).await?;
        tokio::fs::write(&self.config.png_path, png).await?;
        Ok(Artifact::Png(PathBuf::from(&self.config.png_path)))
    }

    async fn write_markdown(&self, mermaid: &str) -> Result<Artifact, ExportError> {
        let markdown = format!("```mermaid\n{}\n```", mermaid.trim_end());
        tokio::fs::write(&self.config.markdown_path, markdown).await?;
        Ok(Artifact::Markdown(PathBuf::from(&self.config.markdown_path)))
    }

    /// Export the diagram, falling back to Markdown when PNG rendering fails
    pub async fn export(&self, graph: &ChainGraph) -> Result<Artifact, ExportError> {
        let mermaid = render_mermaid(graph);

        match self.write_png(&mermaid).await {
            Ok(artifact) => return Ok(artifact),
            Err(e) => log::warn!("PNG export failed: {}", e),
        }

        self.write_markdown(&mermaid).await
    }

    /// Export and log the outcome; never fails
    pub async fn export_best_effort(&self, graph: &ChainGraph) -> Option<Artifact> {
        banner("Rendering Workflow Diagram");

        match self.export(graph).await {
            Ok(Artifact::Png(path)) => {
                log::info!("Diagram saved as PNG → {}", path.display());
                Some(Artifact::Png(path))
            }
            Ok(Artifact::Markdown(path)) => {
                log::info!("Saved Mermaid diagram source → {}", path.display());
                Some(Artifact::Markdown(path))
            }
            Err(e) => {
                log::error!("Could NOT generate any diagram: {}", e);
                None
            }
        }
    }
}
