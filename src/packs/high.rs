//! High tier - commands that alter system state.
//!
//! This includes patterns for:
//! - shutdown, reboot and halt (including runlevel switches)
//! - privilege escalation to a root shell
//! - world-writable permission changes
//! - ownership changes to root

use crate::packs::PatternRule;
use crate::pattern_rule;

/// Create the High tier table.
pub fn create_rules() -> Vec<PatternRule> {
    vec![
        pattern_rule!(High, "shutdown", "Will shutdown the system"),
        pattern_rule!(High, "reboot", "Will restart the system"),
        pattern_rule!(High, "halt", "Will halt the system"),
        pattern_rule!(High, "init 0", "Will shutdown the system"),
        pattern_rule!(High, "init 6", "Will restart the system"),
        pattern_rule!(High, "sudo su", "Escalates to root privileges"),
        pattern_rule!(
            High,
            "chmod 777",
            "Makes files world-writable (security risk)"
        ),
        pattern_rule!(High, "chown root", "Changes ownership to root"),
        // PowerShell
        pattern_rule!(High, "stop-computer", "Will shutdown the system"),
        pattern_rule!(High, "restart-computer", "Will restart the system"),
    ]
}
