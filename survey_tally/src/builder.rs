pub use crate::config::*;

/// The raw key/value bag of a form submission.
///
/// A name may carry several values (checkboxes). Names in the PHP array
/// style (`q_topics[]`) are stored without the brackets.
///
/// ```
/// use survey_tally::builder::RawSubmission;
///
/// let mut raw = RawSubmission::new();
/// raw.add("q_topics[]", "tech");
/// raw.add("q_topics[]", "art");
/// raw.add("q_rating", " 5 ");
///
/// assert_eq!(raw.values("q_topics"), ["tech", "art"]);
/// assert_eq!(raw.single("q_rating"), Some(" 5 "));
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RawSubmission {
    pub(crate) _fields: Vec<(String, Vec<String>)>,
}

impl RawSubmission {
    pub fn new() -> RawSubmission {
        RawSubmission {
            _fields: Vec::new(),
        }
    }

    /// Builds a submission from (name, value) pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> RawSubmission
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut res = RawSubmission::new();
        for (k, v) in pairs {
            res.add(k.as_ref(), v);
        }
        res
    }

    /// Adds one value for a field name.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        let name = name.strip_suffix("[]").unwrap_or(name);
        match self._fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, vals)) => vals.push(value.into()),
            None => self._fields.push((name.to_string(), vec![value.into()])),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> RawSubmission {
        self.add(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self._fields.iter().any(|(n, _)| n == name)
    }

    /// All the values sent for a name. Empty if the name is absent.
    pub fn values(&self, name: &str) -> &[String] {
        self._fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// The value of a single-valued field. When a name is repeated, the
    /// last value wins.
    pub fn single(&self, name: &str) -> Option<&str> {
        self.values(name).last().map(|s| s.as_str())
    }
}
