/// Growing-area classification standards.
///
/// Maps each `GrowingClass` to the bacteriological limits a growing area
/// must meet to hold that classification under systematic random sampling
/// (NSSP, membrane-filtration E. coli, MPN or CFU per 100 ml). This is the
/// single source of truth for the limits; analysis code should look them up
/// here rather than hardcoding numbers.

use crate::model::{ClassificationStandard, GrowingClass};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Standards entry for one classification.
pub struct StandardEntry {
    pub class: GrowingClass,
    /// Which harvest activity the classification permits.
    pub harvest: &'static str,
    /// Limits for the classification. Prohibited and unclassified areas have
    /// no bacteriological standard to meet.
    pub standard: Option<ClassificationStandard>,
}

/// Approved and conditionally approved areas share one standard, as do
/// restricted and conditionally restricted areas.
pub static STANDARDS_REGISTRY: &[StandardEntry] = &[
    StandardEntry {
        class: GrowingClass::Approved,
        harvest: "Direct harvest for market",
        standard: Some(ClassificationStandard {
            max_geometric_mean: 14.0,
            max_p90: 31.0,
        }),
    },
    StandardEntry {
        class: GrowingClass::ConditionallyApproved,
        harvest: "Direct harvest while the management plan's conditions are met",
        standard: Some(ClassificationStandard {
            max_geometric_mean: 14.0,
            max_p90: 31.0,
        }),
    },
    StandardEntry {
        class: GrowingClass::ConditionallyRestricted,
        harvest: "Relaying or depuration while the management plan's conditions are met",
        standard: Some(ClassificationStandard {
            max_geometric_mean: 88.0,
            max_p90: 163.0,
        }),
    },
    StandardEntry {
        class: GrowingClass::Restricted,
        harvest: "Relaying or depuration only",
        standard: Some(ClassificationStandard {
            max_geometric_mean: 88.0,
            max_p90: 163.0,
        }),
    },
    StandardEntry {
        class: GrowingClass::Prohibited,
        harvest: "No harvest",
        standard: None,
    },
    StandardEntry {
        class: GrowingClass::Unclassified,
        harvest: "No harvest until classified",
        standard: None,
    },
];

/// Looks up the registry entry for a classification.
pub fn find_standard(class: GrowingClass) -> Option<&'static StandardEntry> {
    STANDARDS_REGISTRY.iter().find(|e| e.class == class)
}

/// Conditional classifications add a management plan on top of the
/// standard of their unconditional counterpart.
pub fn is_conditional(class: GrowingClass) -> bool {
    matches!(
        class,
        GrowingClass::ConditionallyApproved | GrowingClass::ConditionallyRestricted
    )
}

/// The most permissive unconditional classification whose standard the
/// given statistics satisfy, or `None` if they exceed every standard.
pub fn best_supported_class(geometric_mean: f64, p90: f64) -> Option<GrowingClass> {
    STANDARDS_REGISTRY
        .iter()
        .filter(|e| !is_conditional(e.class))
        .filter_map(|e| e.standard.as_ref().map(|s| (e.class, s)))
        .find(|(_, s)| geometric_mean <= s.max_geometric_mean && p90 <= s.max_p90)
        .map(|(class, _)| class)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
