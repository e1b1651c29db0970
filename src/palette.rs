// Command palette: quick-action suggestions over a fixed catalog.

/// One slash command. `expanded_query` is the full prompt the command
/// expands to when selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub command: &'static str,
    pub description: &'static str,
    pub expanded_query: &'static str,
}

pub const CATALOG: &[PaletteEntry] = &[
    PaletteEntry {
        command: "/cpu",
        description: "CPU usage breakdown",
        expanded_query: "What is my CPU usage?",
    },
    PaletteEntry {
        command: "/memory",
        description: "Memory/RAM usage",
        expanded_query: "Show me memory usage",
    },
    PaletteEntry {
        command: "/disk",
        description: "Disk space usage",
        expanded_query: "Check disk space",
    },
    PaletteEntry {
        command: "/diskio",
        description: "Disk I/O stats",
        expanded_query: "Show disk I/O stats",
    },
    PaletteEntry {
        command: "/network",
        description: "Network traffic",
        expanded_query: "Show network traffic",
    },
    PaletteEntry {
        command: "/alerts",
        description: "Active alerts",
        expanded_query: "What alerts are active?",
    },
    PaletteEntry {
        command: "/processes",
        description: "Top CPU processes",
        expanded_query: "What processes are using the most CPU?",
    },
    PaletteEntry {
        command: "/load",
        description: "System load",
        expanded_query: "What is the system load?",
    },
    PaletteEntry {
        command: "/system",
        description: "System info",
        expanded_query: "Show system information",
    },
    PaletteEntry {
        command: "/investigate",
        description: "Full investigation",
        expanded_query: "Investigate the current system state thoroughly",
    },
    PaletteEntry {
        command: "/diagnose",
        description: "Diagnose alerts",
        expanded_query: "Check active alerts and diagnose them",
    },
];

/// Stable substring filter: an entry matches when the trimmed, lowercased
/// query occurs in its command token or description. Catalog declaration
/// order is preserved; no relevance ranking.
pub fn matches(query: &str) -> Vec<&'static PaletteEntry> {
    let q = query.trim().to_lowercase();
    CATALOG
        .iter()
        .filter(|e| e.command.contains(&q) || e.description.to_lowercase().contains(&q))
        .collect()
}

/// Clamps a selection index into `[0, match_count - 1]`; `None` when the
/// filtered list is empty (nothing selectable, the palette hides).
pub fn clamp_selection(selected: usize, match_count: usize) -> Option<usize> {
    if match_count == 0 {
        None
    } else {
        Some(selected.min(match_count - 1))
    }
}
