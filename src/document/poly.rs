//! The single-or-list container used throughout the lab document.
//!
//! The lab file stores a collection with exactly one element as the bare
//! element, not a one-element list, and switches to a list only when a
//! second element appears. Every mutation site shares this one type so the
//! normalization rule is never re-derived: push on a singleton produces a
//! two-element list, shrinking a list to one element collapses it back to a
//! singleton, and shrinking to zero removes the collection entirely
//! (`None`). Encoding preserves whichever shape is held.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolySet<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> PolySet<T> {
    pub fn len(&self) -> usize {
        match self {
            PolySet::One(_) => 1,
            PolySet::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            PolySet::One(item) => std::slice::from_ref(item).iter(),
            PolySet::Many(items) => items.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        match self {
            PolySet::One(item) => std::slice::from_mut(item).iter_mut(),
            PolySet::Many(items) => items.iter_mut(),
        }
    }

    /// Append an element, promoting a singleton to a list. Insertion order
    /// is preserved.
    pub fn push(self, item: T) -> Self {
        match self {
            PolySet::One(first) => PolySet::Many(vec![first, item]),
            PolySet::Many(mut items) => {
                items.push(item);
                PolySet::Many(items)
            }
        }
    }

    /// Replace the first element matching `matches` in place, or append when
    /// none does.
    pub fn upsert(self, item: T, matches: impl Fn(&T) -> bool) -> Self {
        match self {
            PolySet::One(first) if matches(&first) => PolySet::One(item),
            PolySet::Many(mut items) => {
                match items.iter_mut().find(|existing| matches(&**existing)) {
                    Some(slot) => *slot = item,
                    None => items.push(item),
                }
                PolySet::Many(items)
            }
            set => set.push(item),
        }
    }

    /// Keep only elements satisfying `keep`, renormalizing the result:
    /// an emptied collection becomes `None`, a list shrunk to one element
    /// collapses back to a singleton.
    pub fn retain(self, keep: impl Fn(&T) -> bool) -> Option<Self> {
        let kept: Vec<T> = match self {
            PolySet::One(item) => {
                if keep(&item) {
                    vec![item]
                } else {
                    vec![]
                }
            }
            PolySet::Many(items) => items.into_iter().filter(|item| keep(item)).collect(),
        };
        Self::from_vec(kept)
    }

    fn from_vec(mut items: Vec<T>) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => Some(PolySet::One(items.remove(0))),
            _ => Some(PolySet::Many(items)),
        }
    }
}
