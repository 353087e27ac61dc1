use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::controls::{self, ControlRole, ControlSet};
use crate::debounce::{DebouncedInput, Debouncer};
use crate::query::{self, Href};
use crate::sync;
use crate::types::{Field, FilterState};

/// A page load requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    /// State the next page will parse out of `url`
    pub state: FilterState,
}

/// Timer behind the student search box
#[derive(Debug)]
enum SearchTimer {
    /// Driven by the caller through `poll`
    Clock(Debouncer<String>),
    /// Owned tokio task; settled values come out of `settled`
    Task(DebouncedInput<String>),
}

/// Filter bar of one loaded page.
///
/// Built from the page location and the controls the page exposes. User
/// events either update control displays locally or return a
/// [`Navigation`]; the controller never applies a navigation to itself,
/// since the next page load builds a fresh controller.
#[derive(Debug)]
pub struct FilterController {
    state: FilterState,
    staged: FilterState,
    controls: ControlSet,
    base_path: String,
    search: SearchTimer,
    disposed: bool,
}

impl FilterController {
    /// Controller whose search debounce is driven by [`poll`](Self::poll)
    pub fn new(location: &str, controls: ControlSet, config: &Config) -> Self {
        let search = SearchTimer::Clock(Debouncer::new(config.debounce));
        Self::build(location, controls, config, search)
    }

    /// Controller owning a tokio timer for the search debounce. Settled
    /// searches are awaited with [`settled`](Self::settled). Must be called
    /// inside a tokio runtime.
    pub fn spawn(location: &str, controls: ControlSet, config: &Config) -> Self {
        let search = SearchTimer::Task(DebouncedInput::spawn(config.debounce));
        Self::build(location, controls, config, search)
    }

    fn build(location: &str, controls: ControlSet, config: &Config, search: SearchTimer) -> Self {
        let href = Href::split(location);
        let state = query::parse(href.query);
        let base_path = if config.base_path.is_empty() {
            href.path.to_string()
        } else {
            config.base_path.clone()
        };

        let mut controller = Self {
            staged: state.clone(),
            state,
            controls,
            base_path,
            search,
            disposed: false,
        };
        controls::project_to_controls(&controller.state, &mut controller.controls);
        controller.log_snapshot();
        controller
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Filter form edits not yet submitted
    pub fn staged(&self) -> &FilterState {
        &self.staged
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// A select or hidden control changed.
    ///
    /// Form controls only stage the edit and refresh the displays. The
    /// header month selector and the search box navigate right away.
    pub fn on_change(&mut self, role: ControlRole, value: &str) -> Option<Navigation> {
        if self.disposed {
            return None;
        }
        debug!(control = role.element_id(), value, "Control changed");

        if role.is_staged() {
            self.staged.set(role.field(), value);
            controls::project_to_controls(&self.staged, &mut self.controls);
            return None;
        }

        if role.is_debounced() {
            match &mut self.search {
                SearchTimer::Clock(debouncer) => {
                    debouncer.cancel();
                }
                SearchTimer::Task(input) => input.cancel(),
            }
        }
        self.change_field(role.field(), value)
    }

    /// A keystroke in a control.
    ///
    /// In the search box the value is debounced: nothing navigates until
    /// its quiet window elapses. If the previous value's window already ran
    /// out before `now`, that value navigates here. Keystrokes in form
    /// controls are staged like [`on_change`](Self::on_change).
    pub fn on_input(&mut self, role: ControlRole, value: &str, now: Instant) -> Option<Navigation> {
        if self.disposed {
            return None;
        }
        if !role.is_debounced() {
            if role.is_staged() {
                self.staged.set(role.field(), value);
                controls::project_to_controls(&self.staged, &mut self.controls);
            } else {
                debug!(control = role.element_id(), "Ignoring input on a control without debounce");
            }
            return None;
        }

        if let Some(control) = self.controls.get_mut(role) {
            control.display(value);
        }
        let due = match &mut self.search {
            SearchTimer::Clock(debouncer) => debouncer.push(value.to_string(), now),
            SearchTimer::Task(input) => {
                input.input(value.to_string());
                None
            }
        };
        self.change_field(Field::StudentQuery, &due?)
    }

    /// Deliver the settled search value, if its quiet window has passed
    pub fn poll(&mut self, now: Instant) -> Option<Navigation> {
        if self.disposed {
            return None;
        }
        let value = match &mut self.search {
            SearchTimer::Clock(debouncer) => debouncer.poll(now)?,
            SearchTimer::Task(_) => return None,
        };
        self.change_field(Field::StudentQuery, &value)
    }

    /// Wait for the owned timer to settle a search that changes the filter.
    ///
    /// Returns `None` right away for a controller built with
    /// [`new`](Self::new), and once the controller is disposed.
    pub async fn settled(&mut self) -> Option<Navigation> {
        loop {
            if self.disposed {
                return None;
            }
            let value = match &mut self.search {
                SearchTimer::Task(input) => input.next().await?,
                SearchTimer::Clock(_) => return None,
            };
            if let Some(nav) = self.change_field(Field::StudentQuery, &value) {
                return Some(nav);
            }
        }
    }

    /// When [`poll`](Self::poll) should be called next
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.search {
            SearchTimer::Clock(debouncer) => debouncer.deadline(),
            SearchTimer::Task(_) => None,
        }
    }

    /// Submit the filter form. The hidden month follows the form's month
    /// selector, and the listing restarts at page 1.
    pub fn submit_form(&mut self) -> Option<Navigation> {
        if self.disposed {
            return None;
        }
        if let Some(month) = self.controls.value(ControlRole::FormMonthSelector).map(str::to_string) {
            if let Some(hidden) = self.controls.get_mut(ControlRole::HiddenMonth) {
                hidden.display(&month);
            }
        }

        let mut next = controls::read_form(&self.staged, &self.controls);
        next.page = None;
        debug!(mes = ?next.month, "Filter form submitted");
        self.navigate_if_changed(next)
    }

    /// Follow a pagination link, carrying the active filters along
    pub fn click_pagination(&self, href: &str) -> Option<Navigation> {
        if self.disposed {
            return None;
        }
        let url = query::rewrite_link(href, &self.state, &Field::FILTERS);
        let state = query::parse_location(&url);
        info!(url = %url, page = state.effective_page(), "Navigating");
        Some(Navigation { url, state })
    }

    /// Follow a "remove filter" chip
    pub fn remove_filter(&mut self, field: Field) -> Option<Navigation> {
        if self.disposed {
            return None;
        }
        let next = sync::remove_filter(&self.state, field);
        self.navigate_if_changed(next)
    }

    pub fn remove_filter_href(&self, field: Field) -> String {
        sync::remove_filter_href(&self.state, field, &self.base_path)
    }

    /// Rewrite the page's pagination links so they keep the active filters
    pub fn pagination_links<S: AsRef<str>>(&self, hrefs: &[S]) -> Vec<String> {
        sync::rewrite_pagination_links(hrefs, &self.state)
    }

    /// Cancel the pending search and stop reacting to events
    pub fn dispose(&mut self) {
        match &mut self.search {
            SearchTimer::Clock(debouncer) => {
                if let Some(dropped) = debouncer.cancel() {
                    debug!(value = %dropped, "Discarded pending search");
                }
            }
            SearchTimer::Task(input) => input.dispose(),
        }
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn change_field(&mut self, field: Field, value: &str) -> Option<Navigation> {
        if sync::is_noop(&self.state, field, value) {
            debug!(field = %field, "Value unchanged, not navigating");
            return None;
        }
        let next = sync::apply_field_change(&self.state, field, value);
        Some(self.navigation(next))
    }

    fn navigate_if_changed(&self, next: FilterState) -> Option<Navigation> {
        if next == self.state {
            debug!("Filters unchanged, not navigating");
            return None;
        }
        Some(self.navigation(next))
    }

    fn navigation(&self, state: FilterState) -> Navigation {
        let url = query::serialize(&state, &self.base_path);
        info!(url = %url, "Navigating");
        Navigation { url, state }
    }

    fn log_snapshot(&self) {
        debug!(
            mes = ?self.state.month,
            turma = ?self.state.group,
            tipo = ?self.state.kind,
            page = ?self.state.page,
            mes_selector = ?self.controls.value(ControlRole::MonthSelector),
            mes_selector_2 = ?self.controls.value(ControlRole::FormMonthSelector),
            hidden_mes = ?self.controls.value(ControlRole::HiddenMonth),
            "Filter state loaded"
        );
    }
}
