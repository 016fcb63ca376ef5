//! Wire format types for upstream provider protocols
//!
//! Each module holds the serde structs matching one upstream API and the
//! translation between them and the canonical types.

pub mod bedrock;
pub mod openai;
