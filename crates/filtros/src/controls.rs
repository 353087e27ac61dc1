use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{Field, FilterState};

/// A filter control a page may expose. Pages expose different subsets;
/// a role with no bound control is simply skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlRole {
    /// Month selector in the page header; navigates immediately
    MonthSelector,
    /// Month selector inside the filter form; staged until submit
    FormMonthSelector,
    /// Hidden month input submitted with the filter form
    HiddenMonth,
    GroupSelector,
    KindSelector,
    StatusSelector,
    /// Free-text student search; debounced
    StudentSearch,
}

impl ControlRole {
    pub const ALL: [ControlRole; 7] = [
        ControlRole::MonthSelector,
        ControlRole::FormMonthSelector,
        ControlRole::HiddenMonth,
        ControlRole::GroupSelector,
        ControlRole::KindSelector,
        ControlRole::StatusSelector,
        ControlRole::StudentSearch,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            ControlRole::MonthSelector => "mes-selector",
            ControlRole::FormMonthSelector => "mes-selector-2",
            ControlRole::HiddenMonth => "hidden-mes",
            ControlRole::GroupSelector => "turma-selector",
            ControlRole::KindSelector => "tipo-selector",
            ControlRole::StatusSelector => "status-selector",
            ControlRole::StudentSearch => "estudante-search",
        }
    }

    pub fn from_element_id(id: &str) -> Option<ControlRole> {
        ControlRole::ALL.into_iter().find(|r| r.element_id() == id)
    }

    /// The state field this control displays
    pub fn field(self) -> Field {
        match self {
            ControlRole::MonthSelector
            | ControlRole::FormMonthSelector
            | ControlRole::HiddenMonth => Field::Month,
            ControlRole::GroupSelector => Field::Group,
            ControlRole::KindSelector => Field::Kind,
            ControlRole::StatusSelector => Field::Status,
            ControlRole::StudentSearch => Field::StudentQuery,
        }
    }

    /// Controls whose edits are held back until the filter form is submitted
    pub fn is_staged(self) -> bool {
        matches!(
            self,
            ControlRole::FormMonthSelector
                | ControlRole::HiddenMonth
                | ControlRole::GroupSelector
                | ControlRole::KindSelector
                | ControlRole::StatusSelector
        )
    }

    pub fn is_debounced(self) -> bool {
        self == ControlRole::StudentSearch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Select,
    Hidden,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
    /// Rendered with the `month-active` highlight
    pub active: bool,
}

impl SelectOption {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            selected: false,
            active: false,
        }
    }
}

/// Display state of one bound control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub kind: ControlKind,
    pub value: String,
    pub options: Vec<SelectOption>,
}

impl Control {
    pub fn select(values: &[&str]) -> Self {
        Self {
            kind: ControlKind::Select,
            value: String::new(),
            options: values.iter().map(|v| SelectOption::new(v)).collect(),
        }
    }

    pub fn hidden() -> Self {
        Self {
            kind: ControlKind::Hidden,
            value: String::new(),
            options: Vec::new(),
        }
    }

    pub fn text() -> Self {
        Self {
            kind: ControlKind::Text,
            value: String::new(),
            options: Vec::new(),
        }
    }

    /// Show `value`, marking the matching option. Returns whether anything
    /// visible changed.
    pub fn display(&mut self, value: &str) -> bool {
        let mut changed = false;
        if self.value != value {
            self.value = value.to_string();
            changed = true;
        }
        for option in &mut self.options {
            let matches = option.value == value;
            let active = matches && !value.is_empty();
            if option.selected != matches || option.active != active {
                option.selected = matches;
                option.active = active;
                changed = true;
            }
        }
        changed
    }

    pub fn active_option(&self) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.active)
    }
}

/// The controls present on the current page, keyed by role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlSet {
    bindings: BTreeMap<ControlRole, Control>,
}

impl ControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind controls by element id. Ids with no known role are skipped.
    pub fn from_elements<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = (S, Control)>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for (id, control) in elements {
            match ControlRole::from_element_id(id.as_ref()) {
                Some(role) => set.bind(role, control),
                None => debug!(id = id.as_ref(), "Ignoring unknown control"),
            }
        }
        set
    }

    pub fn bind(&mut self, role: ControlRole, control: Control) {
        self.bindings.insert(role, control);
    }

    pub fn with(mut self, role: ControlRole, control: Control) -> Self {
        self.bind(role, control);
        self
    }

    pub fn get(&self, role: ControlRole) -> Option<&Control> {
        self.bindings.get(&role)
    }

    pub fn get_mut(&mut self, role: ControlRole) -> Option<&mut Control> {
        self.bindings.get_mut(&role)
    }

    pub fn is_bound(&self, role: ControlRole) -> bool {
        self.bindings.contains_key(&role)
    }

    pub fn value(&self, role: ControlRole) -> Option<&str> {
        self.get(role).map(|c| c.value.as_str())
    }

    pub fn roles(&self) -> impl Iterator<Item = ControlRole> + '_ {
        self.bindings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = (&ControlRole, &mut Control)> {
        self.bindings.iter_mut()
    }
}

/// Write `state` into every bound control. Returns how many controls
/// changed; a second pass with the same state returns 0.
pub fn project_to_controls(state: &FilterState, controls: &mut ControlSet) -> usize {
    let mut changed = 0;
    for (role, control) in controls.iter_mut() {
        let value = state.get(role.field()).unwrap_or_default();
        if control.display(&value) {
            changed += 1;
        }
    }
    changed
}

/// Read the filter form back into a state. The hidden month follows the
/// form's month selector when both are present. Unbound roles keep the
/// value from `base`.
pub fn read_form(base: &FilterState, controls: &ControlSet) -> FilterState {
    let mut state = base.clone();
    for role in controls.roles().filter(|r| r.is_staged()) {
        if role == ControlRole::HiddenMonth && controls.is_bound(ControlRole::FormMonthSelector) {
            continue;
        }
        if let Some(value) = controls.value(role) {
            state.set(role.field(), value);
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTHS: &[&str] = &["", "01", "02", "03", "04"];

    fn alertas_page() -> ControlSet {
        ControlSet::new()
            .with(ControlRole::MonthSelector, Control::select(MONTHS))
            .with(ControlRole::FormMonthSelector, Control::select(MONTHS))
            .with(ControlRole::HiddenMonth, Control::hidden())
            .with(ControlRole::GroupSelector, Control::select(&["", "5A", "6B"]))
            .with(ControlRole::KindSelector, Control::select(&["", "X", "Y"]))
    }

    // ========== ControlRole tests ==========

    #[test]
    fn test_element_ids_round_trip() {
        for role in ControlRole::ALL {
            assert_eq!(ControlRole::from_element_id(role.element_id()), Some(role));
        }
        assert_eq!(ControlRole::from_element_id("filter-form"), None);
    }

    #[test]
    fn test_month_roles_share_field() {
        assert_eq!(ControlRole::MonthSelector.field(), Field::Month);
        assert_eq!(ControlRole::FormMonthSelector.field(), Field::Month);
        assert_eq!(ControlRole::HiddenMonth.field(), Field::Month);
    }

    #[test]
    fn test_header_month_selector_not_staged() {
        assert!(!ControlRole::MonthSelector.is_staged());
        assert!(ControlRole::FormMonthSelector.is_staged());
        assert!(!ControlRole::StudentSearch.is_staged());
    }

    // ========== ControlSet tests ==========

    #[test]
    fn test_from_elements_skips_unknown_ids() {
        let set = ControlSet::from_elements(vec![
            ("mes-selector", Control::select(MONTHS)),
            ("export-btn", Control::hidden()),
            ("hidden-mes", Control::hidden()),
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.is_bound(ControlRole::MonthSelector));
        assert!(set.is_bound(ControlRole::HiddenMonth));
        assert!(!set.is_bound(ControlRole::FormMonthSelector));
    }

    #[test]
    fn test_empty_set() {
        let mut set = ControlSet::new();
        assert!(set.is_empty());
        assert_eq!(project_to_controls(&FilterState::new().with_month("03"), &mut set), 0);
    }

    // ========== projection tests ==========

    #[test]
    fn test_project_syncs_all_month_controls() {
        let mut set = alertas_page();
        let state = FilterState::new().with_month("03").with_group("5A");
        project_to_controls(&state, &mut set);

        assert_eq!(set.value(ControlRole::MonthSelector), Some("03"));
        assert_eq!(set.value(ControlRole::FormMonthSelector), Some("03"));
        assert_eq!(set.value(ControlRole::HiddenMonth), Some("03"));
        assert_eq!(set.value(ControlRole::GroupSelector), Some("5A"));
        assert_eq!(set.value(ControlRole::KindSelector), Some(""));
    }

    #[test]
    fn test_project_highlights_active_option() {
        let mut set = alertas_page();
        project_to_controls(&FilterState::new().with_month("03"), &mut set);

        let selector = set.get(ControlRole::MonthSelector).unwrap();
        assert_eq!(selector.active_option().map(|o| o.value.as_str()), Some("03"));
        assert_eq!(selector.options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn test_project_moves_highlight() {
        let mut set = alertas_page();
        project_to_controls(&FilterState::new().with_month("03"), &mut set);
        project_to_controls(&FilterState::new().with_month("04"), &mut set);

        let selector = set.get(ControlRole::FormMonthSelector).unwrap();
        let active: Vec<&str> = selector
            .options
            .iter()
            .filter(|o| o.active)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(active, vec!["04"]);
    }

    #[test]
    fn test_project_absent_field_selects_blank_option() {
        let mut set = alertas_page();
        project_to_controls(&FilterState::new().with_group("5A"), &mut set);
        project_to_controls(&FilterState::new(), &mut set);

        let group = set.get(ControlRole::GroupSelector).unwrap();
        assert_eq!(group.value, "");
        assert!(group.active_option().is_none());
        assert!(group.options[0].selected);
    }

    #[test]
    fn test_project_is_idempotent() {
        let mut set = alertas_page();
        let state = FilterState::new().with_month("02").with_kind("Y");

        let first = project_to_controls(&state, &mut set);
        let snapshot = set.clone();
        let second = project_to_controls(&state, &mut set);

        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(set, snapshot);
    }

    // ========== read_form tests ==========

    #[test]
    fn test_read_form_prefers_form_month_selector() {
        let mut set = alertas_page();
        project_to_controls(&FilterState::new().with_month("03"), &mut set);
        set.get_mut(ControlRole::FormMonthSelector).unwrap().display("04");

        let state = read_form(&FilterState::new().with_month("03"), &set);
        assert_eq!(state.month.as_deref(), Some("04"));
    }

    #[test]
    fn test_read_form_uses_hidden_month_alone() {
        let mut set = ControlSet::new().with(ControlRole::HiddenMonth, Control::hidden());
        set.get_mut(ControlRole::HiddenMonth).unwrap().display("02");

        let state = read_form(&FilterState::new(), &set);
        assert_eq!(state.month.as_deref(), Some("02"));
    }

    #[test]
    fn test_read_form_keeps_unbound_fields() {
        let set = ControlSet::new().with(ControlRole::KindSelector, Control::select(&["", "X"]));
        let base = FilterState::new().with_student_query("joao").with_kind("X");

        let state = read_form(&base, &set);
        assert_eq!(state.student_query.as_deref(), Some("joao"));
        assert_eq!(state.kind, None);
    }
}
