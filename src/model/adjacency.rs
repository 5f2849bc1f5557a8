//! Previous/next track lookup for the now-playing widget

use super::library::Track;

/// Tracks on either side of the current one in the active playlist
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjacency {
    pub previous: Option<Track>,
    pub next: Option<Track>,
}

impl Adjacency {
    /// Neighbours of `current_id` within `active_list`.
    ///
    /// Both sides are `None` when there is no current track or it is not in
    /// the list. A neighbour id with no entry in `tracks` is also `None`.
    pub fn compute(current_id: Option<&str>, active_list: &[String], tracks: &[Track]) -> Self {
        let Some(current_id) = current_id else {
            return Self::default();
        };
        let Some(index) = active_list.iter().position(|id| id == current_id) else {
            return Self::default();
        };

        let lookup = |id: &String| tracks.iter().find(|t| &t.id == id).cloned();

        let previous = index.checked_sub(1).and_then(|i| active_list.get(i)).and_then(lookup);
        let next = active_list.get(index + 1).and_then(lookup);

        Self { previous, next }
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}
