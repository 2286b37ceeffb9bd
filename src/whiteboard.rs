/// A document open on a whiteboard screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TabDocument {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// One whiteboard screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenTab {
    pub id: String,
    pub title: String,
    pub documents: Vec<TabDocument>,
}

/// The whiteboard's screen tabs. Session state only; documents worth keeping
/// go through the persistence gateway separately.
///
/// There is always at least one tab and always an active one. Closing the
/// last tab resets the strip to a fresh "Screen 1"; closing the active tab
/// hands focus to the last remaining tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStrip {
    tabs: Vec<ScreenTab>,
    active: usize,
    next_tab: u64,
}

impl Default for TabStrip {
    fn default() -> Self {
        Self::new()
    }
}

impl TabStrip {
    pub fn new() -> Self {
        Self {
            tabs: vec![ScreenTab {
                id: "tab-1".into(),
                title: "Screen 1".into(),
                documents: Vec::new(),
            }],
            active: 0,
            next_tab: 1,
        }
    }

    pub fn tabs(&self) -> &[ScreenTab] {
        &self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &ScreenTab {
        &self.tabs[self.active]
    }

    fn fresh_tab(&mut self, title: String) -> ScreenTab {
        self.next_tab += 1;
        ScreenTab {
            id: format!("tab-{}", self.next_tab),
            title,
            documents: Vec::new(),
        }
    }

    /// Add a screen named after its position and focus it.
    pub fn add_tab(&mut self) -> &ScreenTab {
        let title = format!("Screen {}", self.tabs.len() + 1);
        let tab = self.fresh_tab(title);
        self.tabs.push(tab);
        self.active = self.tabs.len() - 1;
        &self.tabs[self.active]
    }

    pub fn switch_to(&mut self, tab_id: &str) -> bool {
        match self.tabs.iter().position(|t| t.id == tab_id) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Rename a screen; blank titles are ignored.
    pub fn rename_tab(&mut self, tab_id: &str, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
            tab.title = title.to_string();
        }
    }

    /// Close a screen. The strip never ends up empty or without focus.
    pub fn remove_tab(&mut self, tab_id: &str) {
        let Some(index) = self.tabs.iter().position(|t| t.id == tab_id) else {
            return;
        };
        self.tabs.remove(index);
        if self.tabs.is_empty() {
            let tab = self.fresh_tab("Screen 1".into());
            self.tabs.push(tab);
            self.active = 0;
            return;
        }
        if index == self.active {
            self.active = self.tabs.len() - 1;
        } else if index < self.active {
            self.active -= 1;
        }
    }

    /// Put a document on the active screen. An id collision replaces the
    /// earlier copy, so reopening a saved document does not duplicate it.
    pub fn open_document(&mut self, document: TabDocument) {
        let tab = &mut self.tabs[self.active];
        match tab.documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => tab.documents.push(document),
        }
    }

    /// Update a document wherever it is open. Returns whether one matched.
    pub fn update_document(&mut self, id: &str, title: &str, content: &str) -> bool {
        for tab in &mut self.tabs {
            if let Some(doc) = tab.documents.iter_mut().find(|d| d.id == id) {
                doc.title = title.to_string();
                doc.content = content.to_string();
                return true;
            }
        }
        false
    }

    /// Close a document on the active screen only.
    pub fn close_in_active(&mut self, id: &str) {
        self.tabs[self.active].documents.retain(|d| d.id != id);
    }

    /// Close a document on every screen it is open on.
    pub fn close_document(&mut self, id: &str) {
        for tab in &mut self.tabs {
            tab.documents.retain(|d| d.id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_screen() {
        let strip = TabStrip::new();
        assert_eq!(strip.tabs().len(), 1);
        assert_eq!(strip.active().title, "Screen 1");
    }

    #[test]
    fn new_tabs_take_focus_and_count_up() {
        let mut strip = TabStrip::new();
        strip.add_tab();
        let third = strip.add_tab().id.clone();
        assert_eq!(strip.tabs().len(), 3);
        assert_eq!(strip.active().id, third);
        assert_eq!(strip.active().title, "Screen 3");
    }

    #[test]
    fn closing_the_active_tab_focuses_the_last_one() {
        let mut strip = TabStrip::new();
        let first = strip.tabs()[0].id.clone();
        strip.add_tab();
        let second = strip.active().id.clone();
        strip.add_tab();
        strip.switch_to(&second);
        strip.remove_tab(&second);
        assert_eq!(strip.tabs().len(), 2);
        // Focus goes to the last remaining screen, not back to the first.
        assert_ne!(strip.active().id, first);
    }

    #[test]
    fn closing_a_tab_before_the_active_one_keeps_focus() {
        let mut strip = TabStrip::new();
        let first = strip.tabs()[0].id.clone();
        strip.add_tab();
        let second = strip.active().id.clone();
        strip.remove_tab(&first);
        assert_eq!(strip.active().id, second);
    }

    #[test]
    fn closing_the_last_tab_resets_the_strip() {
        let mut strip = TabStrip::new();
        let only = strip.tabs()[0].id.clone();
        strip.remove_tab(&only);
        assert_eq!(strip.tabs().len(), 1);
        assert_eq!(strip.active().title, "Screen 1");
        assert_ne!(strip.tabs()[0].id, only);
    }

    #[test]
    fn renaming_ignores_blank_titles() {
        let mut strip = TabStrip::new();
        let id = strip.tabs()[0].id.clone();
        strip.rename_tab(&id, "   ");
        assert_eq!(strip.active().title, "Screen 1");
        strip.rename_tab(&id, " Geometry ");
        assert_eq!(strip.active().title, "Geometry");
    }

    #[test]
    fn reopening_a_document_replaces_the_open_copy() {
        let mut strip = TabStrip::new();
        strip.open_document(TabDocument {
            id: "doc-1".into(),
            title: "Warmup".into(),
            content: "1 + 1".into(),
        });
        strip.open_document(TabDocument {
            id: "doc-1".into(),
            title: "Warmup".into(),
            content: "2 + 2".into(),
        });
        assert_eq!(strip.active().documents.len(), 1);
        assert_eq!(strip.active().documents[0].content, "2 + 2");
    }

    #[test]
    fn documents_live_per_screen() {
        let mut strip = TabStrip::new();
        strip.open_document(TabDocument {
            id: "doc-1".into(),
            title: "Warmup".into(),
            content: String::new(),
        });
        strip.add_tab();
        assert!(strip.active().documents.is_empty());
        assert!(strip.update_document("doc-1", "Warmup", "updated"));
        strip.close_document("doc-1");
        let open: usize = strip.tabs().iter().map(|t| t.documents.len()).sum();
        assert_eq!(open, 0);
    }
}
