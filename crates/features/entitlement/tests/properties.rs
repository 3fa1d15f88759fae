use proptest::prelude::*;
use vhub_entitlement::engine::{Policy, classify, sort_canonical};
use vhub_domain::model::ResourceInstance;

fn owned_resources(count: usize) -> Vec<ResourceInstance> {
    (0..count)
        .map(|i| ResourceInstance {
            id: format!("vcard:{i:04}"),
            owner_id: "owner-1".to_owned(),
            created_at: 1_700_000_000_000 + i as i64,
        })
        .collect()
}

proptest! {
    #[test]
    fn entitled_count_is_min_of_size_and_limit(count in 0usize..64, limit in 0i64..64) {
        let items = owned_resources(count);
        let decisions = classify(&items, limit, Policy::Standard);

        let entitled = decisions.iter().filter(|d| !d.is_disabled).count();
        prop_assert_eq!(entitled, count.min(limit as usize));
        prop_assert_eq!(decisions.len(), count);
    }

    #[test]
    fn unlimited_never_disables(count in 0usize..64) {
        let items = owned_resources(count);
        let decisions = classify(&items, -1, Policy::Standard);
        prop_assert!(decisions.iter().all(|d| !d.is_disabled));
    }

    #[test]
    fn grandfathered_entitles_at_least_one(count in 1usize..64, limit in 0i64..8) {
        let items = owned_resources(count);
        let decisions = classify(&items, limit, Policy::Grandfathered);

        prop_assert!(!decisions[0].is_disabled);
        let entitled = decisions.iter().filter(|d| !d.is_disabled).count();
        prop_assert_eq!(entitled, count.min((limit.max(1)) as usize));
    }

    #[test]
    fn disabled_set_is_always_a_suffix(count in 0usize..64, limit in 0i64..64) {
        let items = owned_resources(count);
        let decisions = classify(&items, limit, Policy::Standard);

        // Once one resource is disabled, every younger one is too.
        let mut seen_disabled = false;
        for decision in &decisions {
            if seen_disabled {
                prop_assert!(decision.is_disabled);
            }
            seen_disabled |= decision.is_disabled;
        }
    }

    #[test]
    fn classification_is_deterministic(count in 0usize..32, limit in 0i64..32) {
        let items = owned_resources(count);
        prop_assert_eq!(
            classify(&items, limit, Policy::Standard),
            classify(&items, limit, Policy::Standard)
        );
    }

    #[test]
    fn sort_is_stable_under_shuffle(seed in 0u64..1000) {
        let mut items = owned_resources(16);
        // Cheap deterministic shuffle.
        let len = items.len();
        for i in 0..len {
            let j = ((seed as usize).wrapping_mul(31).wrapping_add(i * 7)) % len;
            items.swap(i, j);
        }

        sort_canonical(&mut items);
        for pair in items.windows(2) {
            prop_assert!(
                (pair[0].created_at, &pair[0].id) <= (pair[1].created_at, &pair[1].id)
            );
        }
    }
}
