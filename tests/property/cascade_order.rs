use proptest::prelude::*;

use isoforge::cascade::{CascadeCore, LevelQuery};
use isoforge::catalog::{Choice, SelectionLevel};
use isoforge::exec::ResultRow;
use isoforge::types::CascadeLayout;

type Entry = Vec<String>;

fn catalog_strategy() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(prop::collection::vec("[ab]", 5), 1..12)
}

/// Rows of `catalog` matching the query's filters, one field per level.
fn answer(catalog: &[Entry], query: &LevelQuery) -> Vec<ResultRow> {
    catalog
        .iter()
        .filter(|entry| {
            query
                .filters
                .iter()
                .all(|(level, value)| entry[level as usize] == value)
        })
        .map(|entry| {
            SelectionLevel::ALL
                .iter()
                .zip(entry)
                .map(|(l, v)| (l.display_field(), v.as_str()))
                .collect::<ResultRow>()
        })
        .collect()
}

/// Run the chain to its end, checking each query on the way.
fn drive(
    core: &mut CascadeCore,
    catalog: &[Entry],
    mut next: Option<LevelQuery>,
) -> Result<(), TestCaseError> {
    let levels = core.layout().levels();
    while let Some(query) = next {
        let idx = levels.iter().position(|l| *l == query.level).unwrap();
        let upstream: Vec<SelectionLevel> = query.filters.iter().map(|(l, _)| l).collect();
        prop_assert_eq!(&upstream[..], &levels[..idx]);
        for (level, value) in query.filters.iter() {
            let chosen = core.view(level).and_then(|v| v.chosen.clone());
            prop_assert_eq!(chosen, Some(Choice::value(value)));
        }
        for later in &levels[idx + 1..] {
            prop_assert!(!core.view(*later).unwrap().is_ready());
        }

        next = core.apply(&query, Ok(answer(catalog, &query)));
    }
    Ok(())
}

proptest! {
    #[test]
    fn levels_resolve_in_order_with_upstream_filters(
        catalog in catalog_strategy(),
        simple in any::<bool>(),
        picks in prop::collection::vec((0..5usize, 0..4usize), 0..8),
    ) {
        let layout = if simple { CascadeLayout::Simple } else { CascadeLayout::Full };
        let mut core = CascadeCore::new(layout);
        let first = core.mark_initialized();
        drive(&mut core, &catalog, Some(first))?;
        prop_assert!(core.is_launch_ready());

        for (level_idx, option_idx) in picks {
            let Some(level) = layout.levels().get(level_idx).copied() else {
                continue;
            };
            let options = core.view(level).unwrap().option_values();
            let Some(value) = options.get(option_idx % options.len().max(1)).cloned() else {
                continue;
            };

            let next = core.choose(level, Choice::value(value));
            prop_assert!(next.is_ok());
            drive(&mut core, &catalog, next.unwrap())?;

            // Options always come from rows matching the upstream choices.
            prop_assert!(core.is_launch_ready());
        }
    }
}
