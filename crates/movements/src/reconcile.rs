//! Reconciliation of a server rejection list against the local draft.

use farmastock_core::ProductId;
use farmastock_draft::RejectedLine;

/// Intersect the server's rejected product ids with the draft's current
/// membership.
///
/// The server's list is authoritative but may mention products the user
/// has meanwhile removed from the draft; those entries are dropped rather
/// than flagged. Duplicate ids in the response collapse to the first
/// reason. Pure function: this is the most bug-prone seam of the screen
/// (stale snapshots, ids crossing the wire), so its behavior is pinned
/// here and in the tests below.
pub fn rejected_in_draft(
    draft_product_ids: &[ProductId],
    rejected: &[RejectedLine],
) -> Vec<RejectedLine> {
    let mut seen: Vec<ProductId> = Vec::new();
    rejected
        .iter()
        .filter(|r| draft_product_ids.contains(&r.product_id))
        .filter(|r| {
            if seen.contains(&r.product_id) {
                false
            } else {
                seen.push(r.product_id);
                true
            }
        })
        .cloned()
        .collect()
}
