//! The authoritative tab registry.
//!
//! Tabs are addressed by dense, contiguous indices in `[0, N)`; closing a
//! tab shifts every later tab down by one. Exactly one tab is active
//! whenever the registry is non-empty. The registry mirrors ui-context
//! state and must only be mutated from marshaled work.

use nimbus_common::{ControlError, LoadState, TabInfo, ViewId};

/// One browsable surface as tracked by the registry.
#[derive(Debug, Clone)]
pub struct Tab {
    pub view: ViewId,
    pub url: String,
    pub load_state: LoadState,
    pub title: String,
}

impl Tab {
    pub fn new(view: ViewId, url: impl Into<String>) -> Self {
        Self {
            view,
            url: url.into(),
            load_state: LoadState::Loading,
            title: String::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active: Option<usize>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Append a tab and make it active. Returns its index.
    pub fn push(&mut self, tab: Tab) -> usize {
        self.tabs.push(tab);
        let index = self.tabs.len() - 1;
        self.active = Some(index);
        index
    }

    /// Remove the tab at `index`, renumbering all later tabs down by one.
    /// If the closed tab was active, the tab now occupying the same
    /// position becomes active (or the last remaining one). Closing the
    /// last tab leaves the registry empty with no active index.
    pub fn close(&mut self, index: usize) -> Result<Tab, ControlError> {
        if index >= self.tabs.len() {
            return Err(ControlError::TabNotFound {
                index,
                count: self.tabs.len(),
            });
        }

        let removed = self.tabs.remove(index);

        self.active = match self.active {
            None => None,
            Some(_) if self.tabs.is_empty() => None,
            Some(active) if active == index => Some(index.min(self.tabs.len() - 1)),
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active),
        };

        Ok(removed)
    }

    /// Make the tab at `index` active. Out-of-range indices fail and leave
    /// the active index unchanged.
    pub fn switch(&mut self, index: usize) -> Result<(), ControlError> {
        if index >= self.tabs.len() {
            return Err(ControlError::TabNotFound {
                index,
                count: self.tabs.len(),
            });
        }
        self.active = Some(index);
        Ok(())
    }

    /// The active index. Fails explicitly on an empty registry — "no tabs"
    /// must never be mistaken for "tab 0".
    pub fn active_index(&self) -> Result<usize, ControlError> {
        self.active.ok_or(ControlError::NoTabs)
    }

    pub fn info(&self) -> TabInfo {
        TabInfo {
            count: self.tabs.len(),
            active: self.active,
        }
    }

    pub fn get(&self, index: usize) -> Result<&Tab, ControlError> {
        self.tabs.get(index).ok_or(ControlError::TabNotFound {
            index,
            count: self.tabs.len(),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Tab, ControlError> {
        let count = self.tabs.len();
        self.tabs
            .get_mut(index)
            .ok_or(ControlError::TabNotFound { index, count })
    }

    /// Look up a tab by its backend view id.
    pub fn find_by_view(&mut self, view: ViewId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.view == view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(n: usize) -> TabRegistry {
        let mut reg = TabRegistry::new();
        for i in 0..n {
            reg.push(Tab::new(ViewId(i as u64), format!("https://tab{i}.test")));
        }
        reg
    }

    #[test]
    fn push_makes_new_tab_active() {
        let mut reg = TabRegistry::new();
        assert_eq!(reg.push(Tab::new(ViewId(0), "a")), 0);
        assert_eq!(reg.push(Tab::new(ViewId(1), "b")), 1);
        assert_eq!(reg.active_index().unwrap(), 1);
        assert_eq!(reg.info().count, 2);
    }

    #[test]
    fn close_renumbers_later_tabs() {
        let mut reg = registry_with(3);
        reg.switch(2).unwrap();
        reg.close(0).unwrap();
        // Former tabs 1 and 2 are now 0 and 1; active followed its tab.
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(0).unwrap().view, ViewId(1));
        assert_eq!(reg.get(1).unwrap().view, ViewId(2));
        assert_eq!(reg.active_index().unwrap(), 1);
    }

    #[test]
    fn close_active_promotes_same_position() {
        let mut reg = registry_with(3);
        reg.switch(1).unwrap();
        reg.close(1).unwrap();
        // Former tab 2 slid into position 1 and became active.
        assert_eq!(reg.active_index().unwrap(), 1);
        assert_eq!(reg.get(1).unwrap().view, ViewId(2));
    }

    #[test]
    fn close_active_at_end_falls_back_to_last() {
        let mut reg = registry_with(2);
        assert_eq!(reg.active_index().unwrap(), 1);
        reg.close(1).unwrap();
        assert_eq!(reg.active_index().unwrap(), 0);
    }

    #[test]
    fn close_last_tab_empties_registry() {
        let mut reg = registry_with(1);
        reg.close(0).unwrap();
        assert!(reg.is_empty());
        assert!(matches!(reg.active_index(), Err(ControlError::NoTabs)));
        assert_eq!(reg.info().active, None);
    }

    #[test]
    fn close_nonactive_keeps_active_tab() {
        // Scenario B: close tab 0 while tab 1 is active.
        let mut reg = registry_with(2);
        reg.close(0).unwrap();
        let info = reg.info();
        assert_eq!(info.count, 1);
        assert_eq!(info.active, Some(0));
        assert_eq!(reg.get(0).unwrap().view, ViewId(1));
    }

    #[test]
    fn switch_one_past_end_fails_without_state_change() {
        let mut reg = registry_with(2);
        reg.switch(0).unwrap();
        let err = reg.switch(2).unwrap_err();
        assert!(matches!(
            err,
            ControlError::TabNotFound { index: 2, count: 2 }
        ));
        assert_eq!(reg.active_index().unwrap(), 0);
    }

    #[test]
    fn operations_on_empty_registry_fail_explicitly() {
        let mut reg = TabRegistry::new();
        assert!(reg.switch(0).is_err());
        assert!(reg.close(0).is_err());
        assert!(reg.get(0).is_err());
        assert!(matches!(reg.active_index(), Err(ControlError::NoTabs)));
    }

    #[test]
    fn active_always_valid_across_random_close_sequence() {
        let mut reg = registry_with(6);
        for index in [3, 0, 2, 2, 0] {
            reg.close(index).unwrap();
            let info = reg.info();
            match info.active {
                Some(a) => assert!(a < info.count, "active {a} out of range {}", info.count),
                None => assert_eq!(info.count, 0),
            }
        }
    }

    #[test]
    fn find_by_view_id() {
        let mut reg = registry_with(3);
        reg.close(0).unwrap();
        assert!(reg.find_by_view(ViewId(0)).is_none());
        let tab = reg.find_by_view(ViewId(2)).unwrap();
        tab.load_state = LoadState::Loaded;
        assert_eq!(reg.get(1).unwrap().load_state, LoadState::Loaded);
    }
}
