//! Built-in transformers.
//!
//! | name               | priority | hook                         |
//! |--------------------|----------|------------------------------|
//! | `highlighter`      | 200      | fence (replace)              |
//! | `anchor`           | 100      | heading (replace)            |
//! | `container-<type>` | 90       | container `<type>` (add)     |
//! | `include`          | 80       | source rule `include`        |
//! | `mermaid`          | 70       | fence (wrap)                 |
//! | `alert`            | 60       | every container (replace)    |
//! | `code-copy`        | 50       | fence (wrap)                 |

mod alert;
mod anchor;
mod code_copy;
mod container;
mod highlighter;
mod include;
mod mermaid;

pub use alert::AlertTransformer;
pub use anchor::AnchorTransformer;
pub use code_copy::CodeCopyTransformer;
pub use container::ContainerTransformer;
pub use highlighter::HighlighterTransformer;
pub use include::{FileReader, IncludeTransformer, MAX_INCLUDE_DEPTH};
pub use mermaid::MermaidTransformer;
