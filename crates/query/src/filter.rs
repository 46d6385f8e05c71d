use crate::result::LineageResult;

/// Remove process vertices and every edge touching them
pub fn filter_out_processes(result: &mut LineageResult) -> usize {
    let removed = result.remove_vertices_where(|vertex| vertex.is_process);
    if removed > 0 {
        log::debug!("Filtered out {removed} process vertices");
    }
    removed
}

/// Keep only vertices whose display name contains `needle`
pub fn filter_display_name(result: &mut LineageResult, needle: &str, case_sensitive: bool) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let removed = if case_sensitive {
        result.remove_vertices_where(|vertex| !vertex.display_name.contains(needle))
    } else {
        let needle = needle.to_lowercase();
        result.remove_vertices_where(|vertex| !vertex.display_name.to_lowercase().contains(&needle))
    };
    if removed > 0 {
        log::debug!("Display name filter {needle:?} removed {removed} vertices");
    }
    removed
}
