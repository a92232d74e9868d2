use chrono::{DateTime, Local};

/// Who wrote an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label shown in front of the entry text.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Tú",
            Role::Assistant => "Asistente consular",
        }
    }
}

/// One unit of transcript content.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Local>,
}

impl Entry {
    fn new(role: Role, text: String) -> Self {
        Self {
            role,
            text,
            created_at: Local::now(),
        }
    }
}

/// Reference to an entry returned by [`Transcript::append`].
///
/// Deliberately neither `Clone` nor `Copy`: whoever appended the entry is the
/// only one able to rewrite it.
#[derive(Debug, PartialEq, Eq)]
pub struct EntryHandle {
    index: usize,
}

impl EntryHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Display target for the transcript. Notified after every append and every
/// text replacement, which is where auto-scroll happens.
pub trait Surface {
    fn appended(&mut self, index: usize, entry: &Entry);
    fn updated(&mut self, index: usize, entry: &Entry);
}

/// Surface that renders nothing.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn appended(&mut self, _index: usize, _entry: &Entry) {}
    fn updated(&mut self, _index: usize, _entry: &Entry) {}
}

/// Append-only, ordered sequence of entries.
pub struct Transcript<S: Surface> {
    entries: Vec<Entry>,
    surface: S,
}

impl<S: Surface> Transcript<S> {
    pub fn new(surface: S) -> Self {
        Self {
            entries: Vec::new(),
            surface,
        }
    }

    /// Add an entry at the tail and render it.
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> EntryHandle {
        let index = self.entries.len();
        self.entries.push(Entry::new(role, text.into()));
        self.surface.appended(index, &self.entries[index]);
        EntryHandle { index }
    }

    /// Replace the text of the entry behind `handle`, leaving every other entry
    /// and the ordering untouched.
    pub fn set_text(&mut self, handle: &EntryHandle, text: impl Into<String>) {
        // Entries are never removed, so a handle issued by this transcript
        // always points at a live entry.
        if let Some(entry) = self.entries.get_mut(handle.index) {
            entry.text = text.into();
            self.surface.updated(handle.index, entry);
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, handle: &EntryHandle) -> Option<&Entry> {
        self.entries.get(handle.index)
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl Default for Transcript<NullSurface> {
    fn default() -> Self {
        Self::new(NullSurface)
    }
}

/// Records every notification; handy for asserting render behaviour.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub appended: Vec<(usize, Role, String)>,
    pub updated: Vec<(usize, String)>,
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn appended(&mut self, index: usize, entry: &Entry) {
        self.appended.push((index, entry.role, entry.text.clone()));
    }

    fn updated(&mut self, index: usize, entry: &Entry) {
        self.updated.push((index, entry.text.clone()));
    }
}
