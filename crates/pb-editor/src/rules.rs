//! Placement rules: which component types may live inside which parents.

use crate::config::EditorConfig;
use pb_core::model::kinds;
use pb_core::tree::ParentKind;

/// Whether a `child_type` component may be dropped into `parent`.
///
/// The root accepts anything. A `Section` only lives at the root and a
/// `MultiColumn` never nests in another `MultiColumn`. Configured container
/// types take everything else; leaves and unknown parents take nothing.
pub fn can_drop_child(parent: ParentKind<'_>, child_type: &str, config: &EditorConfig) -> bool {
    match parent {
        ParentKind::Root => true,
        ParentKind::Unknown => false,
        ParentKind::Component(parent_type) => {
            if child_type == kinds::SECTION {
                return false;
            }
            if parent_type == kinds::MULTI_COLUMN && child_type == kinds::MULTI_COLUMN {
                return false;
            }
            config.is_container_type(parent_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(parent: ParentKind<'_>, child: &str) -> bool {
        can_drop_child(parent, child, &EditorConfig::default())
    }

    #[test]
    fn root_takes_anything() {
        for child in ["Section", "MultiColumn", "Text", "Whatever"] {
            assert!(allowed(ParentKind::Root, child));
        }
    }

    #[test]
    fn sections_stay_at_root() {
        assert!(!allowed(ParentKind::Component("Section"), "Section"));
        assert!(!allowed(ParentKind::Component("Container"), "Section"));
    }

    #[test]
    fn multicolumn_does_not_nest() {
        assert!(!allowed(ParentKind::Component("MultiColumn"), "MultiColumn"));
        assert!(allowed(ParentKind::Component("Section"), "MultiColumn"));
        assert!(allowed(ParentKind::Component("MultiColumn"), "Image"));
    }

    #[test]
    fn leaves_and_unknown_take_nothing() {
        assert!(!allowed(ParentKind::Component("Text"), "Text"));
        assert!(!allowed(ParentKind::Unknown, "Text"));
    }

    #[test]
    fn configured_container_types() {
        let config = EditorConfig {
            container_types: vec!["Card".into()],
            ..EditorConfig::default()
        };
        assert!(can_drop_child(ParentKind::Component("Card"), "Text", &config));
        assert!(!can_drop_child(ParentKind::Component("Section"), "Text", &config));
    }
}
