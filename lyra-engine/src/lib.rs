//! lyra-engine library interface
//!
//! Converts song-lyric text into a structured bundle of musical and emotional
//! features (tempo, key, genre, vocal, instrumentation, color) plus two
//! generation-ready prompt strings.
//!
//! ```no_run
//! use lyra_engine::{AnalysisPipeline, AnalysisRequest};
//!
//! let pipeline = AnalysisPipeline::default();
//! let result = pipeline.analyze(&AnalysisRequest::new("[Chorus]\nWe rise again"));
//! assert!(result.ok);
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod pipeline;
pub mod result;
pub mod tier1; // Text extractors
pub mod tier2; // Fusers and synthesizers
pub mod tier3; // Merge and validation
pub mod translate;
pub mod types;

pub use crate::config::{EngineConfig, EngineStrategy};
pub use crate::error::{AnalysisError, AnalysisOutcome, ErrorCode};
pub use crate::pipeline::{AnalysisPipeline, PipelineBuilder};
pub use crate::result::{Analysis, AnalysisResult};
pub use crate::types::{AnalysisRequest, SemanticHints, UserOverrides, VocalGender};
