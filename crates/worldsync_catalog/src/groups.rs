//! Logical table grouping by name prefix.
//!
//! Tables are assigned to hand-curated groups by prefix matching their
//! lowercased name. The table below is ordered and evaluated first
//! match wins; reordering it changes catalog output, so keep it exactly
//! as is unless the content layout itself changes.

/// The catch-all group for tables no prefix matches.
pub const GROUP_OTHER: &str = "Other / Misc";

/// Ordered (group, prefixes) pairs. First match wins.
const GROUP_PREFIXES: &[(&str, &[&str])] = &[
    ("Zones", &["zone"]),
    ("Loot", &["loot"]),
    ("Spawns & Placement", &["spawn", "groundspawn"]),
    ("NPCs & Factions", &["npc", "faction"]),
    ("Items", &["item"]),
    ("Quests", &["quest"]),
    ("Merchants", &["merchant"]),
    ("Spells", &["spell"]),
    ("Tradeskills", &["tradeskill", "recipe"]),
    ("Rules", &["rule", "variable"]),
    ("Books", &["book"]),
];

/// Assigns the logical group for a table name.
///
/// Pure function of the lowercased name and the fixed prefix table.
pub fn assign_group(table: &str) -> &'static str {
    let lowered = table.to_lowercase();
    for (group, prefixes) in GROUP_PREFIXES {
        if prefixes.iter().any(|prefix| lowered.starts_with(prefix)) {
            return group;
        }
    }
    GROUP_OTHER
}

/// All known group names, in evaluation order, ending with the
/// catch-all.
pub fn known_groups() -> impl Iterator<Item = &'static str> {
    GROUP_PREFIXES
        .iter()
        .map(|(group, _)| *group)
        .chain(std::iter::once(GROUP_OTHER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_determinism() {
        assert_eq!(assign_group("quest_rewards"), "Quests");
        assert_eq!(assign_group("spawn_npcs"), "Spawns & Placement");
        assert_eq!(assign_group("totally_unknown_xyz"), GROUP_OTHER);
    }

    #[test]
    fn grouping_is_case_insensitive() {
        assert_eq!(assign_group("Zone_Details"), "Zones");
        assert_eq!(assign_group("LOOT_TABLES"), "Loot");
    }

    #[test]
    fn first_match_wins_over_later_groups() {
        // "spawn_npcs" starts with both "spawn" and contains "npc";
        // Spawns & Placement is evaluated first.
        assert_eq!(assign_group("spawn_npcs"), "Spawns & Placement");
        assert_eq!(assign_group("npc_spawns"), "NPCs & Factions");
    }

    #[test]
    fn known_groups_ends_with_catch_all() {
        let groups: Vec<&str> = known_groups().collect();
        assert_eq!(groups.first(), Some(&"Zones"));
        assert_eq!(groups.last(), Some(&GROUP_OTHER));
    }
}
