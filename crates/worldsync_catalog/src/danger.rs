//! The danger classifier for sensitive tables.
//!
//! These tables hold live player, account, guild, broker and house
//! data. Reloading one from a dump wipes real player state, so they are
//! excluded from plans unless the operator opts in explicitly.

use std::collections::HashSet;

/// Tables excluded from plans unless explicitly overridden.
const BUILTIN_DANGER_TABLES: &[&str] = &[
    "accounts",
    "account_age",
    "bans",
    "broker_assets",
    "broker_audit",
    "broker_items",
    "bug_reports",
    "characters",
    "character_aa",
    "character_achievements",
    "character_buffs",
    "character_buyback",
    "character_claim_items",
    "character_collections",
    "character_collection_items",
    "character_currency",
    "character_details",
    "character_factions",
    "character_history",
    "character_house_deposits",
    "character_house_history",
    "character_instances",
    "character_items",
    "character_items_group_members",
    "character_languages",
    "character_lua_history",
    "character_macros",
    "character_mail",
    "character_pets",
    "character_pictures",
    "character_properties",
    "character_quests",
    "character_quest_progress",
    "character_quest_rewards",
    "character_quest_temporary_rewards",
    "character_recipes",
    "character_recipe_books",
    "character_skillbar",
    "character_skills",
    "character_social",
    "character_spells",
    "character_spell_effects",
    "character_spell_effect_targets",
    "character_spirit_shards",
    "character_titles",
    "char_colors",
    "guilds",
    "guild_events",
    "guild_event_filters",
    "guild_members",
    "guild_points_history",
    "guild_ranks",
    "guild_recruiting",
    "houses",
    "house_deposits",
    "house_history",
    "house_items",
    "login_bannedips",
    "login_characters",
    "login_char_colors",
    "login_equipment",
    "login_worldservers",
    "petitions",
    "player_statistics",
    "statistics",
    "web_routes",
    "web_sessions",
    "web_users",
];

/// A fixed set of table names considered sensitive.
///
/// Used only as a filter; never mutated after construction. The builtin
/// list can be extended at construction so operators can protect
/// additional tables without a rebuild.
#[derive(Debug, Clone)]
pub struct DangerSet {
    names: HashSet<String>,
}

impl DangerSet {
    /// Creates the builtin danger set.
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_DANGER_TABLES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }

    /// Creates an empty danger set (nothing is protected).
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    /// Adds extra protected table names.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Case-sensitive exact-match membership test.
    pub fn contains(&self, table: &str) -> bool {
        self.names.contains(table)
    }

    /// Number of protected tables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is protected.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for DangerSet {
    fn default() -> Self {
        Self::builtin()
    }
}
