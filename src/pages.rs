/// Named pages with a single active pointer.
///
/// Insertion order is kept. The active name, when set, always refers to a
/// page that is currently registered.
#[derive(Debug)]
pub struct Pages<T> {
    entries: Vec<(String, T)>,
    active: Option<String>,
}

impl<T> Default for Pages<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            active: None,
        }
    }
}

impl<T> Pages<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    /// Register `page` under `name`. An empty name is rejected and returns
    /// `None`. A duplicate name replaces the previous page in place.
    pub fn add_page(&mut self, name: &str, page: T) -> Option<&mut T> {
        if name.is_empty() {
            return None;
        }
        let index = match self.position(name) {
            Some(index) => {
                self.entries[index].1 = page;
                index
            }
            None => {
                self.entries.push((name.to_string(), page));
                self.entries.len() - 1
            }
        };
        Some(&mut self.entries[index].1)
    }

    /// Make `name` active. Unknown names leave the active page untouched.
    pub fn switch_to_page(&mut self, name: &str) -> Option<&mut T> {
        let index = self.position(name)?;
        self.active = Some(name.to_string());
        Some(&mut self.entries[index].1)
    }

    pub fn active(&self) -> Option<&T> {
        let name = self.active.as_deref()?;
        self.get(name)
    }

    pub fn active_mut(&mut self) -> Option<&mut T> {
        let name = self.active.clone()?;
        self.get_mut(&name)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        let index = self.position(name)?;
        Some(&self.entries[index].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let index = self.position(name)?;
        Some(&mut self.entries[index].1)
    }

    /// Drop every page and reset the active pointer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.active = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
