use log::warn;

use crate::config::MAX_CHECKBOX_OPTIONS;

/// The position of each option of a checkbox question.
///
/// Built once from the options in their defined order and shared by the
/// encoding and the decoding side, so that a bit always maps back to the
/// option that set it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OptionIndex {
    keys: Vec<String>,
}

impl OptionIndex {
    /// Options past the maximum supported count are ignored.
    pub fn new(options: &[(String, String)]) -> OptionIndex {
        if options.len() > MAX_CHECKBOX_OPTIONS {
            warn!(
                "OptionIndex: {} options, only the first {} can be encoded",
                options.len(),
                MAX_CHECKBOX_OPTIONS
            );
        }
        OptionIndex {
            keys: options
                .iter()
                .take(MAX_CHECKBOX_OPTIONS)
                .map(|(k, _)| k.clone())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The zero-based position of an option value.
    pub fn option_index(&self, value: &str) -> Option<u32> {
        self.keys.iter().position(|k| k == value).map(|i| i as u32)
    }

    /// Packs the selected option values into a mask.
    ///
    /// Returns the mask and the values that are not among the options.
    pub fn encode<'a, I>(&self, selected: I) -> (u32, Vec<&'a str>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mask: u32 = 0;
        let mut unknown: Vec<&'a str> = Vec::new();
        for value in selected {
            match self.option_index(value) {
                Some(idx) => mask |= 1 << idx,
                None => unknown.push(value),
            }
        }
        (mask, unknown)
    }

    /// The option values whose bit is set, in option order.
    pub fn decode(&self, mask: u32) -> Vec<&str> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(idx, _)| mask & (1 << idx) != 0)
            .map(|(_, k)| k.as_str())
            .collect()
    }

    /// Adds the bits of one mask to per-option counters.
    pub fn tally(&self, mask: u32, counts: &mut [u64]) {
        for (idx, c) in counts.iter_mut().enumerate().take(self.keys.len()) {
            if mask & (1 << idx) != 0 {
                *c += 1;
            }
        }
    }
}
