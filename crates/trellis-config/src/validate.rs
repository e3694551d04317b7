use crate::ColumnSettings;
use trellis_core::{ExternalLabel, LabelKind};

/// Reserved labels every account has. Compared case-insensitively.
const SYSTEM_LABELS: &[&str] = &[
    "INBOX",
    "SENT",
    "DRAFT",
    "SPAM",
    "TRASH",
    "STARRED",
    "IMPORTANT",
    "UNREAD",
    "CHAT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingClass {
    SystemLabel,
    UserLabel,
    Unknown,
}

/// Outcome of checking one column draft against the rest of the board
/// configuration. Errors block saving; the advisory never does.
#[derive(Debug, Clone)]
pub struct ColumnValidation {
    pub errors: Vec<String>,
    pub binding: Option<BindingClass>,
    pub advisory: Option<String>,
}

impl ColumnValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a column draft. `editing` is the index of the column being
/// edited, so a column never collides with itself.
pub fn validate_column(
    columns: &[ColumnSettings],
    draft: &ColumnSettings,
    editing: Option<usize>,
    labels: &[ExternalLabel],
) -> ColumnValidation {
    let mut errors = Vec::new();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.push("column name must not be empty".to_string());
    }

    let duplicate_name = columns.iter().enumerate().any(|(index, column)| {
        Some(index) != editing && column.name.trim().eq_ignore_ascii_case(name)
    });
    if duplicate_name {
        errors.push(format!("a column named '{name}' already exists"));
    }

    let mut binding = None;
    let mut advisory = None;
    let bound = draft
        .label_binding
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());
    if let Some(bound) = bound {
        let duplicate_binding = columns.iter().enumerate().any(|(index, column)| {
            Some(index) != editing
                && column
                    .label_binding
                    .as_deref()
                    .is_some_and(|other| other.eq_ignore_ascii_case(bound))
        });
        if duplicate_binding {
            errors.push(format!("label '{bound}' is already bound to another column"));
        }

        let class = classify_binding(bound, labels);
        if class == BindingClass::Unknown {
            advisory = Some(format!(
                "label '{bound}' does not exist yet; it will be created on first use"
            ));
        }
        binding = Some(class);
    }

    ColumnValidation {
        errors,
        binding,
        advisory,
    }
}

/// System labels match case-insensitively against the reserved list; user
/// labels require an exact name match.
fn classify_binding(binding: &str, labels: &[ExternalLabel]) -> BindingClass {
    if SYSTEM_LABELS
        .iter()
        .any(|label| label.eq_ignore_ascii_case(binding))
    {
        return BindingClass::SystemLabel;
    }

    if labels
        .iter()
        .any(|label| label.kind == LabelKind::User && label.name == binding)
    {
        return BindingClass::UserLabel;
    }

    BindingClass::Unknown
}
