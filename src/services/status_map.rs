//! Mapping from issue tracker status names to local epic statuses.
//!
//! Tracker workflows are customizable, so the mapping is a fixed
//! case-insensitive table over the names we know about. Anything
//! unrecognized lands on `Planned` rather than failing the sync.

use crate::models::epic::EpicStatus;

/// Map a tracker status name to the local epic status.
pub fn map_remote_status(name: &str) -> EpicStatus {
    match name.to_lowercase().as_str() {
        "to do" | "backlog" | "new" | "open" => EpicStatus::Planned,
        "in progress" | "in review" | "development" => EpicStatus::InProgress,
        "done" | "closed" | "resolved" | "completed" => EpicStatus::Launched,
        "blocked" => EpicStatus::Blocked,
        "on hold" => EpicStatus::Delayed,
        "cancelled" => EpicStatus::Cancelled,
        _ => EpicStatus::Planned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_map_to_their_status() {
        assert_eq!(map_remote_status("To Do"), EpicStatus::Planned);
        assert_eq!(map_remote_status("Backlog"), EpicStatus::Planned);
        assert_eq!(map_remote_status("New"), EpicStatus::Planned);
        assert_eq!(map_remote_status("Open"), EpicStatus::Planned);
        assert_eq!(map_remote_status("In Progress"), EpicStatus::InProgress);
        assert_eq!(map_remote_status("In Review"), EpicStatus::InProgress);
        assert_eq!(map_remote_status("Development"), EpicStatus::InProgress);
        assert_eq!(map_remote_status("Done"), EpicStatus::Launched);
        assert_eq!(map_remote_status("Closed"), EpicStatus::Launched);
        assert_eq!(map_remote_status("Resolved"), EpicStatus::Launched);
        assert_eq!(map_remote_status("Completed"), EpicStatus::Launched);
        assert_eq!(map_remote_status("Blocked"), EpicStatus::Blocked);
        assert_eq!(map_remote_status("On Hold"), EpicStatus::Delayed);
        assert_eq!(map_remote_status("Cancelled"), EpicStatus::Cancelled);
    }

    #[test]
    fn test_mapping_is_case_insensitive() {
        assert_eq!(map_remote_status("DONE"), EpicStatus::Launched);
        assert_eq!(map_remote_status("done"), EpicStatus::Launched);
        assert_eq!(map_remote_status("iN pRoGrEsS"), EpicStatus::InProgress);
    }

    #[test]
    fn test_unknown_names_fall_back_to_planned() {
        assert_eq!(map_remote_status("Waiting for Godot"), EpicStatus::Planned);
        assert_eq!(map_remote_status(""), EpicStatus::Planned);
        // Whitespace is not stripped, so padded names are unknown names.
        assert_eq!(map_remote_status(" done"), EpicStatus::Planned);
    }
}
