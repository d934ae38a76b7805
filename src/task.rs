use std::fmt;

/// A title/description/due-date record. Tasks carry no identity beyond
/// their three values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date: due_date.into(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} (Due: {})", self.title, self.description, self.due_date)
    }
}
