pub mod basic;
pub mod builder;
pub mod feed;
pub mod frontmatter;
pub mod markdown;
pub mod template;
pub mod toc;
pub mod tufte;

pub use builder::{BuildError, BuildReport, Builder, PostMeta};
