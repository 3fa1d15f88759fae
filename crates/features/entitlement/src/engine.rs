//! Pure entitlement classification.
//!
//! The engine ranks an owner's resources by age and decides which of them stay
//! usable under the owner's plan ceiling. It performs no I/O; callers fetch
//! the resources and the limit, the engine only computes.

use vhub_domain::constants::UNLIMITED;
use vhub_domain::model::{EntitlementDecision, Resource};

/// How a plan ceiling is enforced against existing resources.
///
/// Downgrades never delete anything. Resources beyond the ceiling are marked
/// disabled and come back to life when the owner upgrades or trims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// The ceiling applies as-is: the oldest `limit` resources stay entitled.
    Standard,
    /// Legacy owners keep their oldest resource even on a zero-limit plan.
    Grandfathered,
}

impl Policy {
    /// The number of resources this policy actually lets through, or `None`
    /// when the plan is unlimited.
    #[must_use]
    pub fn effective_cap(self, limit: i64) -> Option<u64> {
        if limit == UNLIMITED {
            return None;
        }
        // Any other negative limit is treated as zero.
        let base = u64::try_from(limit).unwrap_or(0);
        match self {
            Self::Standard => Some(base),
            Self::Grandfathered => Some(base.max(1)),
        }
    }
}

/// Orders resources canonically: `created_at` ascending, `id` ascending as a
/// tiebreaker. [`classify`] expects its input in this order.
pub fn sort_canonical<R: Resource>(resources: &mut [R]) {
    resources.sort_by(|a, b| {
        a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(b.id()))
    });
}

/// Classifies each resource as entitled or disabled under the given ceiling.
///
/// The decision is purely positional: the first `effective_cap` resources in
/// canonical order are entitled, the rest are disabled. Output preserves the
/// input order and always has one decision per resource.
#[must_use]
pub fn classify<R: Resource>(resources: &[R], limit: i64, policy: Policy) -> Vec<EntitlementDecision> {
    debug_assert!(
        resources.windows(2).all(|w| {
            (w[0].created_at(), w[0].id()) <= (w[1].created_at(), w[1].id())
        }),
        "resources must be in canonical order"
    );

    let cap = policy.effective_cap(limit);

    resources
        .iter()
        .enumerate()
        .map(|(index, resource)| EntitlementDecision {
            resource_id: resource.id().to_owned(),
            is_disabled: cap.is_some_and(|cap| index as u64 >= cap),
        })
        .collect()
}

/// Pairs each resource with its disabled flag, for listing responses.
///
/// Same positional rule and ordering precondition as [`classify`]; this just
/// keeps the resources and their flags together.
#[must_use]
pub fn annotate<R: Resource>(resources: Vec<R>, limit: i64, policy: Policy) -> Vec<(R, bool)> {
    let decisions = classify(&resources, limit, policy);

    resources
        .into_iter()
        .zip(decisions)
        .map(|(resource, decision)| (resource, decision.is_disabled))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhub_domain::model::ResourceInstance;

    fn resources(n: usize) -> Vec<ResourceInstance> {
        (0..n)
            .map(|i| ResourceInstance {
                id: format!("vcard:{i:03}"),
                owner_id: "owner-1".to_owned(),
                created_at: 1_700_000_000_000 + i as i64,
            })
            .collect()
    }

    #[test]
    fn oldest_resources_survive_a_downgrade() {
        // Five resources on a plan that allows three.
        let items = resources(5);
        let decisions = classify(&items, 3, Policy::Standard);

        let disabled: Vec<bool> = decisions.iter().map(|d| d.is_disabled).collect();
        assert_eq!(disabled, vec![false, false, false, true, true]);
        assert_eq!(decisions[0].resource_id, "vcard:000");
    }

    #[test]
    fn unlimited_plan_disables_nothing() {
        let items = resources(10);
        for policy in [Policy::Standard, Policy::Grandfathered] {
            let decisions = classify(&items, UNLIMITED, policy);
            assert!(decisions.iter().all(|d| !d.is_disabled));
        }
    }

    #[test]
    fn zero_limit_standard_disables_everything() {
        let items = resources(3);
        let decisions = classify(&items, 0, Policy::Standard);
        assert!(decisions.iter().all(|d| d.is_disabled));
    }

    #[test]
    fn grandfathered_keeps_the_oldest_on_zero_limit() {
        let items = resources(3);
        let decisions = classify(&items, 0, Policy::Grandfathered);

        assert!(!decisions[0].is_disabled);
        assert!(decisions[1].is_disabled);
        assert!(decisions[2].is_disabled);
    }

    #[test]
    fn grandfathered_matches_standard_above_zero() {
        let items = resources(4);
        assert_eq!(
            classify(&items, 2, Policy::Grandfathered),
            classify(&items, 2, Policy::Standard)
        );
    }

    #[test]
    fn ties_on_created_at_break_by_id() {
        let mut items = vec![
            ResourceInstance {
                id: "vcard:bbb".to_owned(),
                owner_id: "owner-1".to_owned(),
                created_at: 42,
            },
            ResourceInstance {
                id: "vcard:aaa".to_owned(),
                owner_id: "owner-1".to_owned(),
                created_at: 42,
            },
        ];
        sort_canonical(&mut items);
        assert_eq!(items[0].id, "vcard:aaa");

        let decisions = classify(&items, 1, Policy::Standard);
        assert!(!decisions[0].is_disabled);
        assert!(decisions[1].is_disabled);
    }

    #[test]
    fn negative_non_sentinel_limits_collapse_to_zero() {
        let items = resources(2);
        let decisions = classify(&items, -5, Policy::Standard);
        assert!(decisions.iter().all(|d| d.is_disabled));
    }

    #[test]
    fn annotate_keeps_resources_with_their_flags() {
        let items = resources(3);
        let annotated = annotate(items, 2, Policy::Standard);

        let view: Vec<(&str, bool)> =
            annotated.iter().map(|(r, disabled)| (r.id.as_str(), *disabled)).collect();
        assert_eq!(
            view,
            vec![("vcard:000", false), ("vcard:001", false), ("vcard:002", true)]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let items: Vec<ResourceInstance> = Vec::new();
        assert!(classify(&items, 3, Policy::Standard).is_empty());
    }
}
