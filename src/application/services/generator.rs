//! Fault tree generation service
//!
//! Validates parameters, builds the tree and writes the MEF document.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::error_ext::IoResultExt;
use crate::application::serializer::MefSerializer;
use crate::application::ApplicationResult;
use crate::domain::{FaultTree, TreeBuilder, TreeParams};
use crate::infrastructure::traits::FileSystem;

/// Where the generated document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` selects stdout, anything else is a file path.
    pub fn from_path(path: &Path) -> Self {
        if path == Path::new("-") {
            Self::Stdout
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => f.write_str("-"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Counts of a finished generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub gates: usize,
    pub primary_events: usize,
    /// Primary events per gate
    pub ratio: f64,
    pub target: OutputTarget,
}

impl GenerationReport {
    fn new(tree: &FaultTree, target: OutputTarget) -> Self {
        let gates = tree.num_gates();
        let primary_events = tree.num_events();
        Self {
            gates,
            primary_events,
            ratio: primary_events as f64 / gates as f64,
            target,
        }
    }
}

/// Service running validation, construction and serialization.
pub struct GeneratorService {
    fs: Arc<dyn FileSystem>,
}

impl GeneratorService {
    /// Create a new generator service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Validate `params` and build the tree without writing anything.
    #[instrument(level = "debug", skip(self, params), fields(seed = params.seed))]
    pub fn build(&self, params: &TreeParams) -> ApplicationResult<FaultTree> {
        let shape = params.validate()?;
        Ok(TreeBuilder::new(shape).build())
    }

    /// Build the tree and serialize it into a string.
    pub fn render(
        &self,
        params: &TreeParams,
        target: &OutputTarget,
    ) -> ApplicationResult<(FaultTree, String)> {
        let tree = self.build(params)?;
        let label = target.to_string();
        let document = MefSerializer::new(params, &label)
            .render(&tree)
            .with_context("serialize fault tree")?;
        Ok((tree, document))
    }

    /// Build the tree and write the document to `target`.
    #[instrument(level = "debug", skip(self, params))]
    pub fn generate(
        &self,
        params: &TreeParams,
        target: OutputTarget,
    ) -> ApplicationResult<GenerationReport> {
        let (tree, document) = self.render(params, &target)?;
        debug!(bytes = document.len(), "document rendered");

        match &target {
            OutputTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(document.as_bytes())
                    .and_then(|_| stdout.flush())
                    .with_context("write fault tree to stdout")?;
            }
            OutputTarget::File(path) => {
                self.fs
                    .write(path, &document)
                    .with_path_context("write fault tree", path)?;
            }
        }

        let report = GenerationReport::new(&tree, target);
        info!(
            gates = report.gates,
            primary_events = report.primary_events,
            target = %report.target,
            "fault tree generated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_dash_then_target_is_stdout() {
        assert_eq!(OutputTarget::from_path(Path::new("-")), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_path(Path::new("ft.xml")),
            OutputTarget::File(PathBuf::from("ft.xml"))
        );
    }

    #[test]
    fn given_target_when_displayed_then_shows_path_or_dash() {
        assert_eq!(OutputTarget::Stdout.to_string(), "-");
        assert_eq!(
            OutputTarget::File(PathBuf::from("dir/ft.xml")).to_string(),
            "dir/ft.xml"
        );
    }
}
