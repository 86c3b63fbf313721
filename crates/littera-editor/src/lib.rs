//! In-memory document model for editing a Section's Blocks, with a
//! Markdown-with-mentions source format and a dirty-tracking save protocol.

pub mod markdown;
pub mod mention_session;
pub mod model;
pub mod session;
pub mod structural;

pub use markdown::{container_from_source, parse_source, serialize_nodes};
pub use mention_session::{EntityCandidate, MentionSession};
pub use model::{Container, ContentNode, EditorDoc, Inline};
pub use session::{ContainerDelta, EditorSession};
pub use structural::StructuralCommand;
