//! Critical tier - filesystem-destroying invocations.
//!
//! This includes patterns for:
//! - recursive delete of the filesystem root (`rm -rf /`, `del /s /q c:\*`)
//! - formatting a system volume (`format c:`, `Format-Volume`, `Clear-Disk`)
//! - zero-fill overwrite of a raw device (`dd if=/dev/zero`)
//! - filesystem creation (`mkfs`)

use crate::packs::PatternRule;
use crate::pattern_rule;

/// Create the Critical tier table.
pub fn create_rules() -> Vec<PatternRule> {
    vec![
        pattern_rule!(Critical, "rm -rf /", "Attempts to delete entire filesystem"),
        pattern_rule!(Critical, "rm -rf /*", "Attempts to delete entire filesystem"),
        pattern_rule!(Critical, r"del /s /q c:\*", "Attempts to delete entire C: drive"),
        pattern_rule!(Critical, "format c:", "Attempts to format C: drive"),
        pattern_rule!(Critical, "format /dev/", "Attempts to format system devices"),
        pattern_rule!(Critical, "dd if=/dev/zero", "Attempts to overwrite data with zeros"),
        pattern_rule!(
            Critical,
            "mkfs",
            "Attempts to create new filesystem (destroys data)"
        ),
        // PowerShell
        pattern_rule!(Critical, "format-volume", "Attempts to format a volume"),
        pattern_rule!(
            Critical,
            "clear-disk",
            "Attempts to wipe a disk and its partitions"
        ),
    ]
}
