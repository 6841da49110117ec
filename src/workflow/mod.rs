pub mod generator;
pub mod sink;
pub mod templates;

pub use generator::{ArtifactGenerator, GenerateTarget};
pub use sink::{ArtifactKind, OutputSink};
pub use templates::TemplateStore;
