//! Property-based tests for alias resolution

use proptest::prelude::*;
use serialterm::alias::split_commands;
use serialterm::AliasTable;

proptest! {
    #[test]
    fn test_resolve_without_aliases_is_identity(line in "\\PC*") {
        prop_assert_eq!(AliasTable::new().resolve(&line), line);
    }

    #[test]
    fn test_resolve_is_idempotent(
        trigger in "[a-z]{1,5}",
        expansion in "[A-Z]{1,8}",
        rest in "( [a-z0-9.]{1,8}){0,3}",
        head in "[a-z]{1,6}",
    ) {
        // Upper-case expansions can never be lower-case triggers
        let mut aliases = AliasTable::new();
        aliases.add(&trigger, &expansion);

        let line = format!("{}{}", head, rest);
        let once = aliases.resolve(&line);
        prop_assert_eq!(aliases.resolve(&once), once);
    }

    #[test]
    fn test_resolve_keeps_remainder(
        trigger in "[a-z]{1,5}",
        expansion in "[a-z]{1,8}",
        rest in "( [a-z0-9.]{1,8}){0,3}",
    ) {
        let mut aliases = AliasTable::new();
        aliases.add(&trigger, &expansion);

        let resolved = aliases.resolve(&format!("{}{}", trigger, rest));
        prop_assert_eq!(resolved, format!("{}{}", expansion, rest));
    }

    #[test]
    fn test_add_list_remove(trigger in "[a-z]{1,8}", expansion in "[a-z ]{1,12}") {
        let mut aliases = AliasTable::new();
        aliases.add(&trigger, &expansion);
        prop_assert!(aliases.list().any(|(t, e)| t == trigger && e == expansion));

        aliases.remove(&trigger).unwrap();
        prop_assert!(aliases.list().all(|(t, _)| t != trigger));
    }

    #[test]
    fn test_split_commands_drops_empty_segments(
        parts in prop::collection::vec("[a-z]{0,5}", 1..6),
    ) {
        let line = parts.join(";");
        let expected: Vec<&str> = parts.iter().map(String::as_str).filter(|p| !p.is_empty()).collect();
        prop_assert_eq!(split_commands(&line), expected);
    }
}
