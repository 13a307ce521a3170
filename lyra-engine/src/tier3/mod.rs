// Tier 3: Merge & Validation
//
// Modules in this tier run after Tier 2 has produced the computed style.
// The merger layers overrides on top of it; the validator only reports.
//
// Contract: both accept MergedStyle; only the merger may change it

pub mod override_merger;       // Precedence layering with provenance
pub mod consistency_validator; // Read-only cross checks
