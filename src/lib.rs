//! Creative Compliance - retail-media creative validation engine
//!
//! Checks a serialized creative (canvas geometry, copy, packshots, value tiles,
//! tags, lock-ups) against 18 brand and regulatory rules and returns a scored
//! report. Deterministic: the same document always yields the same report.

pub mod classifier;
pub mod config;
pub mod contrast;
pub mod document;
pub mod engine;
pub mod geometry;
pub mod hashing;
pub mod report;
pub mod rules;

pub use classifier::{ClassifierError, ClassifierVerdict, RuleVerdict, TextClassifier};
pub use config::{ConfigError, EngineConfig};
pub use contrast::{contrast_ratio, contrast_ratio_hex, Color, ColorError};
pub use document::{CreativeDocument, CreativeFormat, Element, ElementKind, InputError};
pub use engine::{ComplianceEngine, EngineError};
pub use geometry::{is_within_safe_zone, rects_overlap, Rect};
pub use report::{ComplianceReport, ExportBlocked, ExportClearance, TextAnalysis};
pub use rules::{Category, RuleResult, Severity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
