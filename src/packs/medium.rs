//! Medium ("caution") tier - consequential but narrower actions.
//!
//! `rm -rf` lives here as well as in the Critical table: a delete of the root
//! hits both, a delete of any other path hits only this one.

use crate::packs::PatternRule;
use crate::pattern_rule;

/// Create the Medium tier table.
pub fn create_rules() -> Vec<PatternRule> {
    vec![
        pattern_rule!(
            Medium,
            "rm -rf",
            "Recursive deletion - verify target path carefully"
        ),
        pattern_rule!(
            Medium,
            "del /s /q",
            "Recursive deletion - verify target path carefully"
        ),
        pattern_rule!(Medium, "crontab -r", "Removes all cron jobs"),
        pattern_rule!(Medium, "systemctl stop", "Stops system services"),
        pattern_rule!(Medium, "service stop", "Stops system services"),
        // PowerShell
        pattern_rule!(Medium, "stop-service", "Stops system services"),
        pattern_rule!(
            Medium,
            "remove-item -recurse",
            "Recursive deletion - verify target path carefully"
        ),
    ]
}
