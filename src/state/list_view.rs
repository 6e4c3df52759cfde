use kl_base::{ApiRelationship, ApiRelationshipKind, AvailableResourceType, ResourceInstance, SyncTarget, WorkspaceNode};

/// Items that can be narrowed by a typed filter.
pub trait Filterable {
    /// Text the filter terms are matched against.
    fn filter_text(&self) -> String;
}

/// A filterable list with one highlighted row.
///
/// `selected` indexes the visible (filtered) rows, so `selected_item` always
/// refers to something on screen.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    items: Vec<T>,
    visible: Vec<usize>,
    selected: usize,
    filter: String,
    filtering: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self { items: Vec::new(), visible: Vec::new(), selected: 0, filter: String::new(), filtering: false }
    }
}

impl<T: Filterable> ListView<T> {
    pub fn new(items: Vec<T>) -> Self {
        let visible = (0..items.len()).collect();
        Self { items, visible, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().filter_map(|&idx| self.items.get(idx))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.visible.get(self.selected).and_then(|&idx| self.items.get(idx))
    }

    /// Highlight the first visible item matching `pred`, if any.
    pub fn select_where(&mut self, pred: impl Fn(&T) -> bool) {
        if let Some(pos) = self.visible.iter().position(|&idx| self.items.get(idx).is_some_and(&pred)) {
            self.selected = pos;
        }
    }

    // === Filter ===

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    fn refilter(&mut self) {
        let terms: Vec<String> = self.filter.split_whitespace().map(str::to_lowercase).collect();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                let text = item.filter_text().to_lowercase();
                terms.iter().all(|term| text.contains(term.as_str()))
            })
            .map(|(idx, _)| idx)
            .collect();
        self.selected = 0;
    }
}

/// Object-safe navigation over a list of any item type.
pub trait ListNav {
    fn move_by(&mut self, delta: isize);
    fn select_first(&mut self);
    fn select_last(&mut self);
    fn start_filter(&mut self);
    fn push_filter(&mut self, c: char);
    fn pop_filter(&mut self);
    /// Stop editing and keep the filter applied.
    fn accept_filter(&mut self);
    fn clear_filter(&mut self);
}

impl<T: Filterable> ListNav for ListView<T> {
    fn move_by(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    fn select_first(&mut self) {
        self.selected = 0;
    }

    fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    fn start_filter(&mut self) {
        self.filtering = true;
    }

    fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.refilter();
    }

    fn pop_filter(&mut self) {
        self.filter.pop();
        self.refilter();
    }

    fn accept_filter(&mut self) {
        self.filtering = false;
    }

    fn clear_filter(&mut self) {
        self.filtering = false;
        self.filter.clear();
        self.refilter();
    }
}

// === Filter text per item type ===

impl Filterable for String {
    fn filter_text(&self) -> String {
        self.clone()
    }
}

impl Filterable for WorkspaceNode {
    fn filter_text(&self) -> String {
        self.path.to_string()
    }
}

impl Filterable for ApiRelationship {
    fn filter_text(&self) -> String {
        let referenced = match &self.kind {
            ApiRelationshipKind::Export { resource_name, .. } => resource_name,
            ApiRelationshipKind::Binding { export_name, .. } => export_name,
        };
        format!("{} {} {} {}", self.kind_label(), self.name, self.status, referenced.as_deref().unwrap_or_default())
    }
}

impl Filterable for SyncTarget {
    fn filter_text(&self) -> String {
        let labels: Vec<String> = self.labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{} {} {}", self.name, self.status, labels.join(" "))
    }
}

impl Filterable for AvailableResourceType {
    fn filter_text(&self) -> String {
        format!("{} {} {}", self.kind, self.resource.resource, self.resource.group_label())
    }
}

impl Filterable for ResourceInstance {
    fn filter_text(&self) -> String {
        format!("{} {} {}", self.name, self.namespace.as_deref().unwrap_or_default(), self.workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(view: &ListView<String>) -> Vec<&str> {
        view.visible().map(String::as_str).collect()
    }

    fn sample() -> ListView<String> {
        ListView::new(vec!["alpha-one".into(), "beta-two".into(), "Alpha-Three".into()])
    }

    // --- selection ---

    #[test]
    fn test_selection_clamps() {
        let mut view = sample();
        view.move_by(-1);
        assert_eq!(view.selected_index(), 0);
        view.move_by(10);
        assert_eq!(view.selected_index(), 2);
        view.select_first();
        assert_eq!(view.selected_item().map(String::as_str), Some("alpha-one"));
        view.select_last();
        assert_eq!(view.selected_item().map(String::as_str), Some("Alpha-Three"));
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let mut view: ListView<String> = ListView::new(Vec::new());
        view.move_by(1);
        view.select_last();
        assert_eq!(view.selected_index(), 0);
        assert!(view.selected_item().is_none());
    }

    // --- filter ---

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut view = sample();
        view.start_filter();
        for c in "ALPHA".chars() {
            view.push_filter(c);
        }
        assert_eq!(names(&view), vec!["alpha-one", "Alpha-Three"]);
    }

    #[test]
    fn test_filter_terms_must_all_match() {
        let mut view = sample();
        for c in "alpha three".chars() {
            view.push_filter(c);
        }
        assert_eq!(names(&view), vec!["Alpha-Three"]);
    }

    #[test]
    fn test_selected_item_follows_filter() {
        let mut view = sample();
        view.move_by(1);
        view.push_filter('t');
        view.push_filter('h');
        assert_eq!(view.selected_item().map(String::as_str), Some("Alpha-Three"));
    }

    #[test]
    fn test_accept_keeps_and_clear_drops_filter() {
        let mut view = sample();
        view.start_filter();
        view.push_filter('b');
        view.accept_filter();
        assert!(!view.is_filtering());
        assert_eq!(view.visible_len(), 1);

        view.clear_filter();
        assert_eq!(view.filter(), "");
        assert_eq!(view.visible_len(), 3);
    }

    #[test]
    fn test_pop_filter_widens() {
        let mut view = sample();
        view.push_filter('b');
        view.push_filter('x');
        assert_eq!(view.visible_len(), 0);
        assert!(view.selected_item().is_none());
        view.pop_filter();
        assert_eq!(names(&view), vec!["beta-two"]);
    }

    #[test]
    fn test_select_where() {
        let mut view = sample();
        view.select_where(|s| s.starts_with("beta"));
        assert_eq!(view.selected_index(), 1);
        view.select_where(|s| s == "missing");
        assert_eq!(view.selected_index(), 1);
    }

    #[test]
    fn test_relationships_match_referenced_names() {
        let export = ApiRelationship::from_export(serde_json::json!({
            "metadata": {"name": "tenancy"},
            "spec": {"resources": [{"name": "widgets", "group": "w.io"}]}
        }));
        let binding = ApiRelationship::from_binding(serde_json::json!({
            "metadata": {"name": "local"},
            "spec": {"reference": {"export": {"name": "gadgets", "path": "root:org"}}}
        }));
        let mut view = ListView::new(vec![export, binding]);

        view.push_filter('w');
        view.push_filter('i');
        view.push_filter('d');
        let visible: Vec<&str> = view.visible().map(|r| r.name.as_str()).collect();
        assert_eq!(visible, vec!["tenancy"]);

        view.clear_filter();
        for c in "gadgets".chars() {
            view.push_filter(c);
        }
        let visible: Vec<&str> = view.visible().map(|r| r.name.as_str()).collect();
        assert_eq!(visible, vec!["local"]);
    }
}
