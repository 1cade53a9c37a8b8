//! Declarative two-section list handed to a rendering surface.
//!
//! Section 0 holds the two actions (regenerate, copy) with no header.
//! Section 1 holds the seven option rows under an "Options" header with a
//! footer hint. The model is rebuilt from an [`OptionState`] on demand and
//! owns no state of its own.

#![allow(missing_docs)]

use serde::Serialize;

use crate::options::state::{CharClass, Edit, OptionState};

pub const ACTIONS_SECTION: usize = 0;
pub const OPTIONS_SECTION: usize = 1;

pub const OPTIONS_HEADER: &str = "Options";
pub const OPTIONS_FOOTER: &str =
    "Option defaults are set from the main app's password generator tool.";

/// Position of a row in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RowRef {
    pub section: usize,
    pub row: usize,
}

impl RowRef {
    #[must_use]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// Tappable rows of the actions section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRow {
    Regenerate,
    Copy,
}

impl ActionRow {
    pub const ORDER: [Self; 2] = [Self::Regenerate, Self::Copy];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Regenerate => "Regenerate Password",
            Self::Copy => "Copy Password",
        }
    }
}

/// Editable rows of the options section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionField {
    Length,
    Uppercase,
    Lowercase,
    Numbers,
    Special,
    MinNumbers,
    MinSpecial,
}

impl OptionField {
    pub const ORDER: [Self; 7] = [
        Self::Length,
        Self::Uppercase,
        Self::Lowercase,
        Self::Numbers,
        Self::Special,
        Self::MinNumbers,
        Self::MinSpecial,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Length => "Length",
            Self::Uppercase => "A-Z",
            Self::Lowercase => "a-z",
            Self::Numbers => "0-9",
            Self::Special => "!@#$%^&*",
            Self::MinNumbers => "Minimum Numbers",
            Self::MinSpecial => "Minimum Special",
        }
    }

    /// The character class a switch row controls.
    #[must_use]
    pub const fn class(self) -> Option<CharClass> {
        match self {
            Self::Uppercase => Some(CharClass::Uppercase),
            Self::Lowercase => Some(CharClass::Lowercase),
            Self::Numbers => Some(CharClass::Numbers),
            Self::Special => Some(CharClass::Special),
            Self::Length | Self::MinNumbers | Self::MinSpecial => None,
        }
    }

    /// Translate a widget change into an edit. `None` when the input kind
    /// doesn't fit the field (a number for a switch, say).
    #[must_use]
    pub fn edit_for(self, input: RowInput) -> Option<Edit> {
        match (self, input) {
            (Self::Length, RowInput::Number(value)) => Some(Edit::SetLength { value }),
            (Self::MinNumbers, RowInput::Number(value)) => Some(Edit::SetMinNumbers { value }),
            (Self::MinSpecial, RowInput::Number(value)) => Some(Edit::SetMinSpecial { value }),
            (field, RowInput::Switch(enabled)) => field
                .class()
                .map(|class| Edit::SetClass { class, enabled }),
            _ => None,
        }
    }
}

/// Value change reported by a row's widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowInput {
    Switch(bool),
    Number(u32),
}

/// Widget a row renders, with its current value and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowControl {
    Slider { value: u32, min: u32, max: u32 },
    Switch { on: bool, enabled: bool },
    Stepper { value: u32, min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Row {
    Action {
        action: ActionRow,
        label: &'static str,
    },
    Option {
        field: OptionField,
        label: &'static str,
        control: RowControl,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub header: Option<&'static str>,
    pub footer: Option<&'static str>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListModel {
    pub sections: Vec<Section>,
}

impl ListModel {
    #[must_use]
    pub fn build(state: &OptionState) -> Self {
        let actions = Section {
            header: None,
            footer: None,
            rows: ActionRow::ORDER
                .into_iter()
                .map(|action| Row::Action {
                    action,
                    label: action.label(),
                })
                .collect(),
        };
        let options = Section {
            header: Some(OPTIONS_HEADER),
            footer: Some(OPTIONS_FOOTER),
            rows: OptionField::ORDER
                .into_iter()
                .map(|field| Row::Option {
                    field,
                    label: field.label(),
                    control: control_for(state, field),
                })
                .collect(),
        };
        Self {
            sections: vec![actions, options],
        }
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Rows in `section`; zero for a section that doesn't exist.
    #[must_use]
    pub fn row_count(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.rows.len())
    }

    #[must_use]
    pub fn row(&self, at: RowRef) -> Option<&Row> {
        self.sections.get(at.section)?.rows.get(at.row)
    }
}

/// Action bound to a row position, if any. Option rows have none.
#[must_use]
pub fn action_at(at: RowRef) -> Option<ActionRow> {
    if at.section == ACTIONS_SECTION {
        ActionRow::ORDER.get(at.row).copied()
    } else {
        None
    }
}

/// Option field bound to a row position, if any.
#[must_use]
pub fn field_at(at: RowRef) -> Option<OptionField> {
    if at.section == OPTIONS_SECTION {
        OptionField::ORDER.get(at.row).copied()
    } else {
        None
    }
}

fn control_for(state: &OptionState, field: OptionField) -> RowControl {
    match field {
        OptionField::Length => {
            let b = state.length_bounds();
            RowControl::Slider {
                value: state.length,
                min: b.min(),
                max: b.max(),
            }
        }
        OptionField::MinNumbers => {
            let b = state.min_numbers_bounds();
            RowControl::Stepper {
                value: state.min_numbers,
                min: b.min(),
                max: b.max(),
            }
        }
        OptionField::MinSpecial => {
            let b = state.min_special_bounds();
            RowControl::Stepper {
                value: state.min_special,
                min: b.min(),
                max: b.max(),
            }
        }
        OptionField::Uppercase => switch_for(state, CharClass::Uppercase),
        OptionField::Lowercase => switch_for(state, CharClass::Lowercase),
        OptionField::Numbers => switch_for(state, CharClass::Numbers),
        OptionField::Special => switch_for(state, CharClass::Special),
    }
}

const fn switch_for(state: &OptionState, class: CharClass) -> RowControl {
    RowControl::Switch {
        on: state.class_enabled(class),
        enabled: !state.is_locked(class),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::policy::PolicyConstraint;
    use crate::options::reconcile::initialize;

    #[test]
    fn list_has_fixed_shape() {
        let model = ListModel::build(&OptionState::default());
        assert_eq!(model.section_count(), 2);
        assert_eq!(model.row_count(ACTIONS_SECTION), 2);
        assert_eq!(model.row_count(OPTIONS_SECTION), 7);
        assert_eq!(model.row_count(2), 0);
        assert_eq!(model.sections[0].header, None);
        assert_eq!(model.sections[1].header, Some("Options"));
        assert!(model.sections[1].footer.is_some());
    }

    #[test]
    fn option_rows_follow_documented_order() {
        let model = ListModel::build(&OptionState::default());
        let fields: Vec<OptionField> = model.sections[OPTIONS_SECTION]
            .rows
            .iter()
            .filter_map(|row| match row {
                Row::Option { field, .. } => Some(*field),
                Row::Action { .. } => None,
            })
            .collect();
        assert_eq!(fields, OptionField::ORDER.to_vec());
    }

    #[test]
    fn locked_class_renders_disabled_switch() {
        let policy = PolicyConstraint {
            require_digits: true,
            ..Default::default()
        };
        let state = initialize(&OptionState::default(), Some(&policy));
        let model = ListModel::build(&state);
        assert_eq!(
            model.row(RowRef::new(OPTIONS_SECTION, 3)),
            Some(&Row::Option {
                field: OptionField::Numbers,
                label: "0-9",
                control: RowControl::Switch {
                    on: true,
                    enabled: false
                },
            })
        );
        assert_eq!(
            model.row(RowRef::new(OPTIONS_SECTION, 5)),
            Some(&Row::Option {
                field: OptionField::MinNumbers,
                label: "Minimum Numbers",
                control: RowControl::Stepper {
                    value: 1,
                    min: 1,
                    max: 5
                },
            })
        );
    }

    #[test]
    fn slider_reflects_narrowed_bounds() {
        let policy = PolicyConstraint {
            min_length: 12,
            max_length: 20,
            ..Default::default()
        };
        let state = initialize(&OptionState::default(), Some(&policy));
        let model = ListModel::build(&state);
        assert!(matches!(
            model.row(RowRef::new(OPTIONS_SECTION, 0)),
            Some(Row::Option {
                control: RowControl::Slider {
                    value: 12,
                    min: 12,
                    max: 20
                },
                ..
            })
        ));
    }

    #[test]
    fn only_action_rows_have_actions() {
        assert_eq!(action_at(RowRef::new(0, 0)), Some(ActionRow::Regenerate));
        assert_eq!(action_at(RowRef::new(0, 1)), Some(ActionRow::Copy));
        assert_eq!(action_at(RowRef::new(0, 2)), None);
        assert_eq!(action_at(RowRef::new(1, 0)), None);
        assert_eq!(field_at(RowRef::new(1, 6)), Some(OptionField::MinSpecial));
        assert_eq!(field_at(RowRef::new(0, 0)), None);
    }

    #[test]
    fn widget_inputs_map_to_edits() {
        assert_eq!(
            OptionField::Length.edit_for(RowInput::Number(20)),
            Some(Edit::SetLength { value: 20 })
        );
        assert_eq!(
            OptionField::Special.edit_for(RowInput::Switch(false)),
            Some(Edit::SetClass {
                class: CharClass::Special,
                enabled: false
            })
        );
        assert_eq!(OptionField::Length.edit_for(RowInput::Switch(true)), None);
        assert_eq!(OptionField::Numbers.edit_for(RowInput::Number(3)), None);
    }

    #[test]
    fn serializes_with_tags() {
        let json = serde_json::to_value(ListModel::build(&OptionState::default())).unwrap();
        assert_eq!(json["sections"][0]["rows"][1]["action"], "copy");
        assert_eq!(json["sections"][1]["rows"][0]["control"]["kind"], "slider");
    }
}
