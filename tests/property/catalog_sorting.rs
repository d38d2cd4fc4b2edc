use proptest::prelude::*;

use isoforge::catalog::{Choice, Filters, Selection, SelectionLevel, display_values, list_command, sort_rows};
use isoforge::exec::ResultRow;
use isoforge::launcher::{Destination, LaunchOptions, build_launch_command};

fn level_strategy() -> impl Strategy<Value = SelectionLevel> {
    prop::sample::select(SelectionLevel::ALL.to_vec())
}

proptest! {
    #[test]
    fn sort_rows_is_a_stable_case_insensitive_permutation(
        values in prop::collection::vec("[a-cA-C]{0,3}", 0..20)
    ) {
        let mut rows: Vec<ResultRow> = values
            .iter()
            .enumerate()
            .map(|(i, v)| ResultRow::new().with("Name", v.as_str()).with("Index", i))
            .collect();

        sort_rows(&mut rows, "Name");

        let keys: Vec<(String, usize)> = rows
            .iter()
            .map(|r| {
                let name = r.display("Name").unwrap_or_default().to_lowercase();
                let index = r.display("Index").unwrap_or_default().parse().unwrap();
                (name, index)
            })
            .collect();

        for pair in keys.windows(2) {
            prop_assert!(pair[0].0 <= pair[1].0, "not sorted: {:?}", keys);
            if pair[0].0 == pair[1].0 {
                prop_assert!(pair[0].1 < pair[1].1, "not stable: {:?}", keys);
            }
        }

        let mut indices: Vec<usize> = keys.iter().map(|k| k.1).collect();
        indices.sort_unstable();
        prop_assert_eq!(indices, (0..values.len()).collect::<Vec<_>>());
    }

    #[test]
    fn display_values_keep_first_occurrence_order(
        values in prop::collection::vec("[xyz]", 0..12)
    ) {
        let rows: Vec<ResultRow> = values.iter().map(|v| ResultRow::new().with("F", v.as_str())).collect();

        let distinct = display_values(&rows, "F");

        let mut expected: Vec<String> = Vec::new();
        for v in &values {
            if !expected.contains(v) {
                expected.push(v.clone());
            }
        }
        prop_assert_eq!(distinct, expected);
    }

    #[test]
    fn list_commands_only_carry_upstream_filters(
        level in level_strategy(),
        chosen in prop::collection::vec(prop::option::of("[a-z0-9]{1,4}"), 5)
    ) {
        let filters = SelectionLevel::ALL
            .iter()
            .zip(&chosen)
            .filter_map(|(l, v)| Some((*l, v.clone()?)))
            .fold(Filters::new(), |f, (l, v)| f.with(l, v));

        let cmd = list_command("Get-MediaToolList", level, &filters);

        for (other, value) in SelectionLevel::ALL.iter().zip(&chosen) {
            let expected = if *other < level { value.as_deref() } else { None };
            prop_assert_eq!(cmd.text(other.param_name()), expected);
        }
    }

    #[test]
    fn launch_command_reflects_edition_and_flags(
        edition in prop::option::of("[A-Za-z ]{1,12}"),
        skip_confirmation in any::<bool>(),
        recompress in any::<bool>(),
        media in prop::option::of("ISO|ESD"),
    ) {
        let selection = Selection {
            product: "11".into(),
            architecture: "x64".into(),
            language: "en-us".into(),
            media: media.clone(),
            edition: edition.clone().map_or(Choice::All, Choice::Value),
        };
        let options = LaunchOptions { skip_confirmation, recompress };

        let cmd = build_launch_command("New-MediaToolMedia", &selection, &Destination::Drive("E".into()), options);

        prop_assert_eq!(cmd.text("Edition"), edition.as_deref());
        prop_assert_eq!(cmd.text("Media"), media.as_deref());
        prop_assert_eq!(cmd.has("NoPrompt"), skip_confirmation);
        prop_assert_eq!(cmd.has("Recompress"), recompress);
        prop_assert!(cmd.has("Verbose"));
        prop_assert_eq!(cmd.text("Destination"), Some("E:"));
    }
}
