//! Fallback kingdom/phylum names for taxa that only carry ancestor ids.
//!
//! The API lists ancestry root-first: `ancestor_ids[0]` is Life, `[1]` the
//! kingdom and `[2]` the phylum.

use crate::domain::model::UNKNOWN_RANK;

const KINGDOMS: &[(u64, &str)] = &[
    (1, "Animalia"),
    (47126, "Plantae"),
    (47170, "Fungi"),
    (48222, "Chromista"),
    (47686, "Protozoa"),
    (67333, "Bacteria"),
    (151817, "Archaea"),
];

const PHYLA: &[(u64, &str)] = &[
    (57774, "Rhodophyta"),
    (50863, "Chlorophyta"),
    (20978, "Arthropoda"),
    (47115, "Mollusca"),
    (47491, "Annelida"),
    (47549, "Echinodermata"),
    (47534, "Cnidaria"),
    (2, "Chordata"),
];

fn lookup(table: &[(u64, &str)], id: Option<&u64>) -> String {
    id.and_then(|id| table.iter().find(|(known, _)| known == id))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| UNKNOWN_RANK.to_string())
}

pub fn kingdom_from_ancestors(ancestor_ids: &[u64]) -> String {
    lookup(KINGDOMS, ancestor_ids.get(1))
}

pub fn phylum_from_ancestors(ancestor_ids: &[u64]) -> String {
    lookup(PHYLA, ancestor_ids.get(2))
}
