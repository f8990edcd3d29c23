use std::fmt;

/// One of the three synchronized views of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pane {
    Wysiwyg,
    Raw,
    Preview,
}

impl Pane {
    pub const ALL: [Self; 3] = [Self::Wysiwyg, Self::Raw, Self::Preview];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Wysiwyg => "Editor",
            Self::Raw => "Markdown",
            Self::Preview => "Preview",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Wysiwyg => 0b001,
            Self::Raw => 0b010,
            Self::Preview => 0b100,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Wysiwyg => 0,
            Self::Raw => 1,
            Self::Preview => 2,
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A set of panes.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneSet(u8);

impl PaneSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b111)
    }

    /// Every pane except `pane`.
    pub const fn all_except(pane: Pane) -> Self {
        Self(0b111 & !pane.bit())
    }

    pub const fn contains(self, pane: Pane) -> bool {
        self.0 & pane.bit() != 0
    }

    pub const fn insert(&mut self, pane: Pane) {
        self.0 |= pane.bit();
    }

    pub const fn remove(&mut self, pane: Pane) {
        self.0 &= !pane.bit();
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Panes in display order.
    pub fn iter(self) -> impl Iterator<Item = Pane> {
        Pane::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

impl FromIterator<Pane> for PaneSet {
    fn from_iter<I: IntoIterator<Item = Pane>>(iter: I) -> Self {
        let mut set = Self::empty();
        for pane in iter {
            set.insert(pane);
        }
        set
    }
}

impl fmt::Debug for PaneSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_except_omits_origin() {
        let set = PaneSet::all_except(Pane::Raw);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Pane::Wysiwyg, Pane::Preview]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_insert_remove() {
        let mut set = PaneSet::empty();
        assert!(set.is_empty());
        set.insert(Pane::Preview);
        set.insert(Pane::Preview);
        assert_eq!(set.len(), 1);
        set.remove(Pane::Preview);
        assert!(set.is_empty());
    }

    #[test]
    fn test_collect() {
        let set: PaneSet = [Pane::Raw, Pane::Wysiwyg].into_iter().collect();
        assert!(set.contains(Pane::Raw));
        assert!(!set.contains(Pane::Preview));
    }
}
